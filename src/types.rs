//! Configuration and request argument types

use serde::Serialize;

use crate::endpoint::Endpoint;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where the daemon listens
    pub endpoint: Endpoint,
    /// Username for HTTP basic auth
    pub username: Option<String>,
    /// Password for HTTP basic auth
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Configuration with defaults and the given endpoint.
    pub fn for_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }
}

/// Arguments for `torrent-add`.
///
/// Exactly one of `filename` (path or URL of a .torrent file, or a magnet
/// link) and `metainfo` (base64-encoded .torrent content) should be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddArgs {
    /// One or more cookies to send when fetching `filename`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    /// Directory to download the torrent to
    #[serde(rename = "download-dir", skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    /// Filename or URL of the .torrent file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Base64-encoded .torrent content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metainfo: Option<String>,
    /// Don't start the torrent after adding it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    /// Maximum number of peers
    #[serde(rename = "peer-limit", skip_serializing_if = "Option::is_none")]
    pub peer_limit: Option<u32>,
    /// Bandwidth priority of the torrent
    #[serde(rename = "bandwidthPriority", skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<i32>,
    /// Indices of files to download
    #[serde(rename = "files-wanted", skip_serializing_if = "Vec::is_empty")]
    pub files_wanted: Vec<u32>,
    /// Indices of files to skip
    #[serde(rename = "files-unwanted", skip_serializing_if = "Vec::is_empty")]
    pub files_unwanted: Vec<u32>,
    /// Indices of high-priority files
    #[serde(rename = "priority-high", skip_serializing_if = "Vec::is_empty")]
    pub priority_high: Vec<u32>,
    /// Indices of low-priority files
    #[serde(rename = "priority-low", skip_serializing_if = "Vec::is_empty")]
    pub priority_low: Vec<u32>,
    /// Indices of normal-priority files
    #[serde(rename = "priority-normal", skip_serializing_if = "Vec::is_empty")]
    pub priority_normal: Vec<u32>,
}

impl AddArgs {
    /// Add by filename, URL, or magnet link.
    pub fn filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    /// Add by base64-encoded .torrent content.
    pub fn metainfo(metainfo: impl Into<String>) -> Self {
        Self {
            metainfo: Some(metainfo.into()),
            ..Self::default()
        }
    }

    /// Set the download directory.
    pub fn with_download_dir(mut self, dir: impl Into<String>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Add the torrent in the paused state.
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = Some(paused);
        self
    }
}
