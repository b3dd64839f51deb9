//! HTTP transport for the Transmission RPC protocol
//!
//! The daemon guards every call behind a per-session anti-forgery token.
//! [`TransmissionClient`] negotiates that token transparently: a HEAD
//! probe is answered with 409 plus the token header, the token rides
//! along on every subsequent POST, and a stale token triggers exactly one
//! renegotiation and retry before the call fails for good.

use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::decorate::{self, DateStyle, Decorate};
use crate::endpoint::Endpoint;
use crate::error::{Result, TransmissionError};
use crate::response::{self, Reply, Select};
use crate::sanitize;
use crate::types::{AddArgs, ClientConfig};

/// Request header carrying the session token
pub const SESSION_HEADER: &str = "X-Transmission-Session-Id";

const USER_AGENT: &str = concat!("transmission-rpc-client/", env!("CARGO_PKG_VERSION"));

/// Client for the Transmission daemon RPC API
///
/// # Example
///
/// ```rust,no_run
/// use transmission_rpc_client::{ClientConfig, TransmissionClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = TransmissionClient::open("http://localhost:9091")?
///     .with_auth("admin", "secret");
///
/// // List torrents with the default field set
/// let torrents = client.torrents(&[], &[]).await?;
///
/// // Pause everything
/// client.stop(&[]).await?;
/// # Ok(())
/// # }
/// ```
///
/// A client instance executes one call at a time; `call` takes `&mut
/// self` so the token read/invalidate/re-acquire sequence can never be
/// observed mid-replacement. Wrap the client in a mutex or a
/// single-writer task for concurrent use.
pub struct TransmissionClient {
    config: ClientConfig,
    http: Client,
    session_id: Option<String>,
    decoration: Decorate,
    dates: DateStyle,
}

impl TransmissionClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            config,
            http,
            session_id: None,
            decoration: Decorate::default(),
            dates: DateStyle::default(),
        }
    }

    /// Create a client from an endpoint URL string.
    pub fn open(url: &str) -> Result<Self> {
        let endpoint = Endpoint::from_url(url)?;
        Ok(Self::new(ClientConfig::for_endpoint(endpoint)))
    }

    /// Set username and password for HTTP basic auth.
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    /// Set the response decoration policy.
    pub fn with_decoration(mut self, decoration: Decorate) -> Self {
        self.decoration = decoration;
        self
    }

    /// Set the time zone and format used by date decoration.
    pub fn with_date_style(mut self, dates: DateStyle) -> Self {
        self.dates = dates;
        self
    }

    /// Replace the response decoration policy.
    pub fn set_decoration(&mut self, decoration: Decorate) {
        self.decoration = decoration;
    }

    // ==================== RPC primitive ====================

    /// Execute one RPC call.
    ///
    /// Sanitizes `args`, attaches the cached session token (negotiating
    /// one first if absent), POSTs the call envelope, and unwraps the
    /// response per `select`/`needed`. A 409 answer invalidates the
    /// token and retries exactly once after renegotiating; a second 409
    /// fails with [`TransmissionError::Session`].
    pub async fn call(
        &mut self,
        method: &str,
        args: Value,
        select: Select<'_>,
        needed: &[&str],
    ) -> Result<Reply> {
        if method.trim().is_empty() {
            return Err(TransmissionError::InvalidArguments(
                "method name must not be empty".to_string(),
            ));
        }

        let args = sanitize::arguments(args)?;
        let payload = json!({ "method": method, "arguments": args });

        self.ensure_session_id().await?;
        let mut response = self.send_once(&payload).await?;

        if response.status() == StatusCode::CONFLICT {
            debug!("session id rejected for {}, renegotiating", method);
            self.session_id = None;
            self.handshake().await?;
            response = self.send_once(&payload).await?;
            if response.status() == StatusCode::CONFLICT {
                return Err(TransmissionError::Session(
                    "session id rejected again after renegotiation".to_string(),
                ));
            }
        }

        match response.status() {
            StatusCode::OK => {
                let body = read_body(response).await?;
                let mut reply = response::unwrap(body, select, needed)?;
                if let Reply::Data(tree) = &mut reply {
                    decorate::decorate(tree, &self.decoration, &self.dates);
                }
                Ok(reply)
            }
            StatusCode::UNAUTHORIZED => Err(TransmissionError::Authentication),
            status => Err(TransmissionError::Protocol(status.as_u16())),
        }
    }

    /// Negotiate a session token if none is cached.
    async fn ensure_session_id(&mut self) -> Result<()> {
        if self.session_id.is_some() {
            return Ok(());
        }
        self.handshake().await
    }

    /// Probe the endpoint for a fresh session token.
    ///
    /// The daemon always answers the tokenless probe with 409 and puts
    /// the token in the response headers; anything else means the
    /// endpoint is not a reachable Transmission daemon.
    async fn handshake(&mut self) -> Result<()> {
        let request = self.with_credentials(self.http.head(self.config.endpoint.url()));
        let response = request.send().await?;

        match response.status() {
            StatusCode::CONFLICT => {
                let session_id = response
                    .headers()
                    .get(SESSION_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| {
                        TransmissionError::Session(format!(
                            "daemon did not return a {SESSION_HEADER} header"
                        ))
                    })?;
                debug!("negotiated new session id");
                self.session_id = Some(session_id.to_string());
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(TransmissionError::Authentication),
            status => Err(TransmissionError::Protocol(status.as_u16())),
        }
    }

    /// One POST of the call envelope, token and credentials attached.
    async fn send_once(&self, payload: &Value) -> Result<reqwest::Response> {
        let mut request = self.http.post(self.config.endpoint.url()).json(payload);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id.as_str());
        }
        Ok(self.with_credentials(request).send().await?)
    }

    fn with_credentials(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => request.basic_auth(username, Some(password)),
            _ => request,
        }
    }

    // ==================== Torrent operations ====================

    /// Get the torrent list.
    ///
    /// `ids` empty means all torrents. `fields` are merged with the
    /// default set `id`, `name`, `status`, `totalSize`.
    pub async fn torrents(&mut self, ids: &[i64], fields: &[&str]) -> Result<Option<Value>> {
        let mut all_fields = vec!["id", "name", "status", "totalSize"];
        for &field in fields {
            if !all_fields.contains(&field) {
                all_fields.push(field);
            }
        }

        let args = json!({ "fields": all_fields, "ids": ids });
        let reply = self
            .call("torrent-get", args, Select::Path("arguments.torrents"), &[])
            .await?;
        Ok(reply.into_data())
    }

    /// Start torrents.
    pub async fn start(&mut self, ids: &[i64]) -> Result<()> {
        self.ack("torrent-start", json!({ "ids": ids })).await
    }

    /// Start torrents now, bypassing the queue.
    pub async fn start_now(&mut self, ids: &[i64]) -> Result<()> {
        self.ack("torrent-start-now", json!({ "ids": ids })).await
    }

    /// Stop torrents.
    pub async fn stop(&mut self, ids: &[i64]) -> Result<()> {
        self.ack("torrent-stop", json!({ "ids": ids })).await
    }

    /// Reannounce torrents to their trackers.
    pub async fn reannounce(&mut self, ids: &[i64]) -> Result<()> {
        self.ack("reannounce", json!({ "ids": ids })).await
    }

    /// Verify local data of torrents.
    pub async fn verify(&mut self, ids: &[i64]) -> Result<()> {
        self.ack("torrent-verify", json!({ "ids": ids })).await
    }

    /// Set per-torrent parameters (`torrent-set` arguments tree).
    pub async fn set(&mut self, args: Value) -> Result<()> {
        self.ack("torrent-set", args).await
    }

    /// Add a torrent.
    ///
    /// The daemon reports the result under either `torrent-added` or
    /// `torrent-duplicate`; that key is surfaced as a `status` field on
    /// the returned record.
    pub async fn add(&mut self, args: AddArgs) -> Result<Option<Value>> {
        let args = serde_json::to_value(args)?;
        let reply = self
            .call("torrent-add", args, Select::Path("arguments"), &[])
            .await?;
        Ok(reply.into_data().and_then(first_add_result))
    }

    /// Add a torrent by filename, URL, or magnet link.
    pub async fn add_file(
        &mut self,
        filename: &str,
        download_dir: Option<&str>,
    ) -> Result<Option<Value>> {
        let mut args = AddArgs::filename(filename);
        if let Some(dir) = download_dir {
            args = args.with_download_dir(dir);
        }
        self.add(args).await
    }

    /// Add a torrent from a local .torrent file.
    pub async fn add_metainfo(
        &mut self,
        path: impl AsRef<Path>,
        download_dir: Option<&str>,
    ) -> Result<Option<Value>> {
        let raw = tokio::fs::read(path).await?;
        let metainfo = base64::engine::general_purpose::STANDARD.encode(raw);

        let mut args = AddArgs::metainfo(metainfo);
        if let Some(dir) = download_dir {
            args = args.with_download_dir(dir);
        }
        self.add(args).await
    }

    /// Remove torrents, optionally deleting their data.
    pub async fn remove(&mut self, ids: &[i64], delete_local_data: bool) -> Result<()> {
        let args = json!({ "ids": ids, "delete-local-data": delete_local_data });
        self.ack("torrent-remove", args).await
    }

    /// Move torrent data to another location.
    pub async fn move_to(&mut self, ids: &[i64], location: &str) -> Result<()> {
        let args = json!({ "ids": ids, "location": location, "move": true });
        self.ack("torrent-set-location", args).await
    }

    /// Rename a path within torrents.
    pub async fn rename(&mut self, ids: &[i64], path: &str, name: &str) -> Result<()> {
        let args = json!({ "ids": ids, "path": path, "name": name });
        self.ack("torrent-rename-path", args).await
    }

    // ==================== Session operations ====================

    /// Get session variables, optionally projected onto `needed` keys.
    pub async fn session_vars(&mut self, needed: &[&str]) -> Result<Option<Value>> {
        let reply = self
            .call("session-get", json!({}), Select::Path("arguments"), needed)
            .await?;
        Ok(reply.into_data())
    }

    /// Set session variables (`session-set` arguments tree).
    pub async fn set_session_vars(&mut self, args: Value) -> Result<()> {
        self.ack("session-set", args).await
    }

    /// Enable or disable the alternative speed limits.
    pub async fn alt_speed(&mut self, enabled: bool) -> Result<()> {
        self.set_session_vars(json!({ "alt-speed-enabled": enabled }))
            .await
    }

    /// Get session statistics, optionally projected onto `needed` keys.
    pub async fn stats(&mut self, needed: &[&str]) -> Result<Option<Value>> {
        let reply = self
            .call("session-stats", json!({}), Select::Path("arguments"), needed)
            .await?;
        Ok(reply.into_data())
    }

    async fn ack(&mut self, method: &str, args: Value) -> Result<()> {
        self.call(method, args, Select::Ack, &[]).await.map(|_| ())
    }
}

async fn read_body(response: reqwest::Response) -> Result<Option<Value>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

fn first_add_result(tree: Value) -> Option<Value> {
    let Value::Object(map) = tree else {
        return None;
    };
    let (key, mut entry) = map.into_iter().next()?;
    if let Value::Object(record) = &mut entry {
        record.insert("status".to_string(), Value::String(key));
    }
    Some(entry)
}
