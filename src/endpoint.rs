//! Daemon endpoint address

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TransmissionError};

/// Default host when none is given
pub const DEFAULT_HOST: &str = "localhost";
/// Default RPC port of the Transmission daemon
pub const DEFAULT_PORT: u16 = 9091;
/// Default RPC path of the Transmission daemon
pub const DEFAULT_PATH: &str = "/transmission/rpc/";

/// Where the daemon listens. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    secure: bool,
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    /// Create an endpoint from structured parts.
    ///
    /// The path is normalized to begin and end with `/`; an empty path
    /// falls back to [`DEFAULT_PATH`].
    pub fn new(secure: bool, host: impl Into<String>, port: u16, path: &str) -> Self {
        Self {
            secure,
            host: host.into(),
            port,
            path: normalize_path(path),
        }
    }

    /// Parse an endpoint from a URL string.
    ///
    /// `https` implies a secure endpoint. An explicit port is honored;
    /// otherwise the port defaults to 443 for secure endpoints and to
    /// [`DEFAULT_PORT`] for plain ones. Host and path fall back to
    /// [`DEFAULT_HOST`] and [`DEFAULT_PATH`].
    pub fn from_url(input: &str) -> Result<Self> {
        let url = reqwest::Url::parse(input)
            .map_err(|e| TransmissionError::InvalidArguments(format!("invalid URL: {e}")))?;

        let secure = url.scheme() == "https";
        let host = url.host_str().unwrap_or(DEFAULT_HOST).to_string();
        let port = url
            .port()
            .unwrap_or(if secure { 443 } else { DEFAULT_PORT });

        Ok(Self {
            secure,
            host,
            port,
            path: normalize_path(url.path()),
        })
    }

    /// Full URL of the RPC endpoint.
    pub fn url(&self) -> String {
        format!(
            "http{}://{}:{}{}",
            if self.secure { "s" } else { "" },
            self.host,
            self.port,
            self.path
        )
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(false, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PATH)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl FromStr for Endpoint {
    type Err = TransmissionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_url(s)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_PATH.to_string()
    } else {
        format!("/{trimmed}/")
    }
}
