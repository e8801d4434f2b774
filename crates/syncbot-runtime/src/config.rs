//! Socket configuration document and endpoint selection.
//!
//! The service publishes candidate transport endpoints per channel at
//! `<domain>/socketconfig/<channel>.json`. Selection prefers the first
//! secure entry and falls back to the first entry of any kind.

use serde::Deserialize;
use syncbot_core::{Error, Result};

/// One candidate endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    /// Endpoint base URL.
    pub url: String,
    /// Whether the endpoint carries TLS.
    #[serde(default)]
    pub secure: bool,
}

/// The socket configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Candidate endpoints, may be absent.
    pub servers: Vec<ServerEntry>,
    /// Explicit server-side error (unknown channel, maintenance).
    pub error: Option<String>,
}

impl SocketConfig {
    /// Parse a fetched configuration document.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("invalid socket config: {e}")))
    }

    /// Select a server URL: first secure entry, else first entry.
    ///
    /// An explicit `error` field or an empty server list fails with
    /// [`Error::Config`].
    pub fn select_server(&self) -> Result<&str> {
        if let Some(error) = &self.error {
            return Err(Error::Config(error.clone()));
        }
        self.servers
            .iter()
            .find(|s| s.secure)
            .or_else(|| self.servers.first())
            .map(|s| s.url.as_str())
            .ok_or_else(|| Error::Config("no servers in socket config".into()))
    }
}

/// Configuration document URL for a channel. Domains without a scheme get
/// `https://` prefixed.
pub fn config_url(domain: &str, channel: &str) -> String {
    let url = format!("{domain}/socketconfig/{channel}.json");
    if url.starts_with("http") {
        url
    } else {
        format!("https://{url}")
    }
}

/// Transport endpoint URL for a selected server.
pub fn endpoint_url(server: &str) -> String {
    format!("{server}/socket.io/")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
