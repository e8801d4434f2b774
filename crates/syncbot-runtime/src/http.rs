//! HTTP fetch collaborator.

use async_trait::async_trait;
use syncbot_core::FetchError;

/// Fetches a URL as text. The socket-config lookup is the only consumer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the response body.
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher over an existing client (shared pools, custom TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError(e.to_string()))?;
        response.text().await.map_err(|e| FetchError(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn get_returns_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/socketconfig/lobby.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"servers":[]}"#))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new();
        let body = fetcher
            .get(&format!("{}/socketconfig/lobby.json", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, r#"{"servers":[]}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new();
        let err = fetcher.get(&server.uri()).await.unwrap_err();
        assert!(err.to_string().contains("fetch failed"));
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        let fetcher = HttpFetcher::new();
        // Port 1 on loopback refuses immediately.
        let err = fetcher.get("http://127.0.0.1:1/config.json").await;
        assert!(err.is_err());
    }
}
