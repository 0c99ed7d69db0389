/// Everything that ends the check before all metrics are collected.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Hostname parameter (-H) is mandatory")]
    MissingHostname,

    #[error("Token parameter (-k) is mandatory")]
    MissingToken,

    #[error("Token parameter (-k) is not a valid header value")]
    InvalidToken,

    /// The HTTP client could not be constructed.
    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Connection, TLS or non-2xx failure on any API call.
    #[error("Could not contact jellyfin: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The body did not have the expected top-level JSON shape.
    #[error("Invalid response from jellyfin ({path}): {source}")]
    InvalidResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckError {
    /// Configuration errors are reported with the `ERROR` label instead of `CRITICAL`.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            CheckError::MissingHostname | CheckError::MissingToken | CheckError::InvalidToken
        )
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
