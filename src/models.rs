use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::fmt;

/// Accept any JSON for the field; a value of the wrong type becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// --- API response models ---

/// `GET /Items/Counts`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemCountsDto {
    #[serde(default, deserialize_with = "lenient")]
    pub movie_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub series_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub episode_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub box_set_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayStateDto {
    #[serde(default, deserialize_with = "lenient")]
    pub play_method: Option<String>,
}

/// One element of `GET /Sessions`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionDto {
    #[serde(default, deserialize_with = "lenient")]
    pub play_state: Option<PlayStateDto>,
    #[serde(default, deserialize_with = "lenient")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_name: Option<String>,
    /// Kept raw: any non-null value marks the session active.
    #[serde(default)]
    pub now_playing_item: Option<Value>,
}

/// One element of a `user_usage_stats/*/BreakDownReport` response
#[derive(Debug, Deserialize)]
pub struct BreakdownEntryDto {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub time: Option<Value>,
}

// --- Derived records ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub movies: u64,
    pub shows: u64,
    pub episodes: u64,
    pub collections: u64,
}

impl From<ItemCountsDto> for ItemCounts {
    fn from(dto: ItemCountsDto) -> Self {
        Self {
            movies: dto.movie_count.unwrap_or(0),
            shows: dto.series_count.unwrap_or(0),
            episodes: dto.episode_count.unwrap_or(0),
            collections: dto.box_set_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayMethod {
    Transcode,
    DirectPlay,
    DirectStream,
    Other(String),
}

impl From<&str> for PlayMethod {
    fn from(s: &str) -> Self {
        match s {
            "Transcode" => PlayMethod::Transcode,
            "DirectPlay" => PlayMethod::DirectPlay,
            "DirectStream" => PlayMethod::DirectStream,
            other => PlayMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PlayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMethod::Transcode => f.write_str("Transcode"),
            PlayMethod::DirectPlay => f.write_str("DirectPlay"),
            PlayMethod::DirectStream => f.write_str("DirectStream"),
            PlayMethod::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub play_method: Option<PlayMethod>,
    pub client: Option<String>,
    pub device_name: Option<String>,
    pub active: bool,
    pub item_name: Option<String>,
}

impl From<SessionDto> for Session {
    fn from(dto: SessionDto) -> Self {
        let play_method = dto
            .play_state
            .and_then(|s| s.play_method)
            .map(|m| PlayMethod::from(m.as_str()));
        let active = dto.now_playing_item.is_some();
        let item_name = dto
            .now_playing_item
            .as_ref()
            .and_then(|item| item.get("OriginalTitle"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            play_method,
            client: dto.client,
            device_name: dto.device_name,
            active,
            item_name,
        }
    }
}

/// Grouping dimension of a usage breakdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    User,
    Device,
    Platform,
}

impl Breakdown {
    pub const ALL: [Breakdown; 3] = [Breakdown::User, Breakdown::Device, Breakdown::Platform];

    /// Path segment the usage-stats plugin groups by.
    pub fn group_by(self) -> &'static str {
        match self {
            Breakdown::User => "UserId",
            Breakdown::Device => "DeviceName",
            Breakdown::Platform => "ClientName",
        }
    }

    /// Word used in the metric name.
    pub fn metric_key(self) -> &'static str {
        match self {
            Breakdown::User => "user",
            Breakdown::Device => "device",
            Breakdown::Platform => "platform",
        }
    }

    /// User labels come back as `name@server`; only the name is kept.
    pub fn normalize_label(self, label: &str) -> String {
        match self {
            Breakdown::User => label.split('@').next().unwrap_or(label).to_string(),
            Breakdown::Device | Breakdown::Platform => label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageEntry {
    pub label: String,
    pub duration: Number,
}

/// Lookback window for usage breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub label: &'static str,
    pub days: u32,
}

pub const WINDOWS: [Window; 3] = [
    Window {
        label: "today",
        days: 1,
    },
    Window {
        label: "week",
        days: 7,
    },
    Window {
        label: "year",
        days: 365,
    },
];
