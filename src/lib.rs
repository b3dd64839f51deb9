//! Rust client for the Transmission torrent daemon RPC API
//!
//! Speaks the daemon's JSON-over-HTTP protocol, including the
//! `X-Transmission-Session-Id` handshake: the session token is acquired,
//! cached, and refreshed transparently, with exactly one retry when the
//! daemon reports it stale. Outgoing argument trees are normalized to the
//! wire shape the daemon expects, and responses are validated, unwrapped,
//! and optionally decorated into display-friendly values.
//!
//! # Example
//!
//! ```rust,no_run
//! use transmission_rpc_client::{AddArgs, TransmissionClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = TransmissionClient::open("http://localhost:9091")?
//!     .with_auth("admin", "secret");
//!
//! // Add a torrent, paused
//! let added = client
//!     .add(AddArgs::filename("magnet:?xt=urn:btih:...").with_paused(true))
//!     .await?;
//!
//! // List torrents with extra fields
//! let torrents = client.torrents(&[], &["percentDone", "addedDate"]).await?;
//!
//! // Start everything
//! client.start(&[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod decorate;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod sanitize;
pub mod types;

// Re-export main types
pub use client::{TransmissionClient, SESSION_HEADER};
pub use decorate::{Category, DateStyle, Decorate, TorrentStatus};
pub use endpoint::Endpoint;
pub use error::{Result, TransmissionError};
pub use response::{Reply, Select};
pub use types::{AddArgs, ClientConfig};
