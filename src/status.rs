use crate::error::CheckError;
use crate::perfdata::PerfData;
use std::fmt;

/// Monitoring-plugin status, bound to its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(test), allow(dead_code))]
pub enum Status {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        self as u8
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Ok => "#2A9A3D",
            Status::Warning => "#f57700",
            Status::Critical => "#FF0000",
            Status::Unknown => "#f57700",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

/// The single line printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub status: Status,
    pub label: Option<String>,
    pub message: String,
    pub perfdata: PerfData,
}

impl Report {
    pub fn ok(message: impl Into<String>, perfdata: PerfData) -> Self {
        Self {
            status: Status::Ok,
            label: None,
            message: message.into(),
            perfdata,
        }
    }

    pub fn from_error(err: &CheckError) -> Self {
        Self {
            status: Status::Critical,
            label: err.is_usage().then(|| "ERROR".to_string()),
            message: err.to_string(),
            perfdata: PerfData::new(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.status.exit_code()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.as_deref().unwrap_or(self.status.label());
        write!(
            f,
            "<span style=\"color:{};font-weight: bold;\">[{}]</span> {} | {}",
            self.status.color(),
            label,
            self.message,
            self.perfdata
        )
    }
}
