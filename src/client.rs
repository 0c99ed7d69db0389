use crate::args::Args;
use crate::error::{CheckError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const API_PREFIX: &str = "/emby";
const TOKEN_HEADER: &str = "X-Emby-Token";

/// Where and how to reach the server, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
    pub use_tls: bool,
    pub api_key: String,
}

impl ConnectionParams {
    /// Validate the command line. Hostname is checked before the token.
    pub fn from_args(args: &Args) -> Result<Self> {
        let hostname = match args.hostname.as_deref() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(CheckError::MissingHostname),
        };
        let api_key = match args.api_key.as_deref() {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(CheckError::MissingToken),
        };

        Ok(Self {
            hostname,
            port: args.port,
            use_tls: args.use_ssl == 1,
            api_key,
        })
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.hostname, self.port, API_PREFIX)
    }
}

/// Thin GET-only client for the Jellyfin REST API.
pub struct JellyfinClient {
    http: Client,
    base_url: String,
}

impl JellyfinClient {
    pub fn new(params: &ConnectionParams) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&params.api_key)
            .map_err(|_| CheckError::InvalidToken)?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        // No certificate or hostname verification.
        let http = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(CheckError::HttpClient)?;

        Ok(Self {
            http,
            base_url: params.base_url(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and return the elapsed time together with the raw body.
    pub async fn get(&self, path: &str) -> Result<(Duration, String)> {
        let start = Instant::now();
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(CheckError::Unreachable)?
            .error_for_status()
            .map_err(CheckError::Unreachable)?;
        let elapsed = start.elapsed();

        let status = response.status();
        let body = response.text().await.map_err(CheckError::Unreachable)?;
        tracing::debug!(
            "GET {} -> {} in {:.3}s ({} bytes)",
            path,
            status,
            elapsed.as_secs_f64(),
            body.len()
        );

        Ok((elapsed, body))
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<(Duration, T)> {
        let (elapsed, body) = self.get(path).await?;
        let value = serde_json::from_str(&body).map_err(|source| CheckError::InvalidResponse {
            path: path.to_string(),
            source,
        })?;
        Ok((elapsed, value))
    }
}
