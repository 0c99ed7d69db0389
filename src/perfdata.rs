use std::fmt;

/// One performance-data entry: `"name"=value;min;max;warning;critical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub name: String,
    pub value: String,
    pub min: String,
    pub max: String,
    pub warning: String,
    pub critical: String,
}

impl Metric {
    pub fn new(name: impl AsRef<str>, value: impl fmt::Display) -> Self {
        Self {
            name: name.as_ref().replace(' ', "_"),
            value: value.to_string(),
            min: String::new(),
            max: String::new(),
            warning: String::new(),
            critical: String::new(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\"={};{};{};{};{}",
            self.name, self.value, self.min, self.max, self.warning, self.critical
        )
    }
}

/// Metrics in the order they were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerfData {
    metrics: Vec<Metric>,
}

impl PerfData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl AsRef<str>, value: impl fmt::Display) {
        self.metrics.push(Metric::new(name, value));
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, metric) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", metric)?;
        }
        Ok(())
    }
}
