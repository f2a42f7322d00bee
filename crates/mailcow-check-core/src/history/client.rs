//! Mailcow API client for the rspamd history endpoint
//!
//! See: https://mailcow.docs.apiary.io/ (`/api/v1/get/logs/rspamd-history/{count}`)

use super::{parse_history, LogEntry};
use mailcow_check_common::{CheckConfig, Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the rspamd history log endpoint
pub const RSPAMD_HISTORY_PATH: &str = "/api/v1/get/logs/rspamd-history";

/// Mailcow client configuration
#[derive(Debug, Clone)]
pub struct MailcowClientConfig {
    /// Base URL of the Mailcow instance
    pub server: String,
    /// Value for the `X-API-Key` header
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Accept invalid TLS certificates
    pub insecure: bool,
}

impl TryFrom<&CheckConfig> for MailcowClientConfig {
    type Error = Error;

    fn try_from(config: &CheckConfig) -> Result<Self> {
        let server = config
            .server
            .clone()
            .ok_or_else(|| Error::Config("server is not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("API key is not set".to_string()))?;

        Ok(Self {
            server,
            api_key,
            timeout_secs: config.timeout_secs,
            insecure: config.insecure,
        })
    }
}

/// Mailcow HTTP client
pub struct MailcowClient {
    config: MailcowClientConfig,
    client: Client,
}

impl MailcowClient {
    /// Create a new Mailcow client
    pub fn new(config: MailcowClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// URL of the history endpoint for the last `count` entries
    pub fn history_url(&self, count: u32) -> String {
        format!(
            "{}{}/{}",
            self.config.server.trim_end_matches('/'),
            RSPAMD_HISTORY_PATH,
            count
        )
    }

    /// Fetch the most recent `count` rspamd history entries
    pub async fn fetch_history(&self, count: u32) -> Result<Vec<LogEntry>> {
        let url = self.history_url(count);

        debug!("Fetching rspamd history from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!("Mailcow request failed: {}", e);
                Error::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "Mailcow returned error status {}: {}",
                status,
                body.trim()
            )));
        }

        let body = response.text().await.map_err(|e| {
            warn!("Failed to read Mailcow response: {}", e);
            Error::Http(format!("Failed to read response body: {}", e))
        })?;

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedHistory(format!("response is not JSON: {}", e)))?;

        let entries = parse_history(json)?;
        debug!(entries = entries.len(), "Received rspamd history");

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailcow_check_common::Action;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MailcowClient {
        MailcowClient::new(MailcowClientConfig {
            server: server.uri(),
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            insecure: false,
        })
        .unwrap()
    }

    #[test]
    fn test_history_url_trims_slash() {
        let client = MailcowClient::new(MailcowClientConfig {
            server: "https://mail.example.com/".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 5,
            insecure: false,
        })
        .unwrap();

        assert_eq!(
            client.history_url(200),
            "https://mail.example.com/api/v1/get/logs/rspamd-history/200"
        );
    }

    #[test]
    fn test_config_from_check_config() {
        let mut check = CheckConfig {
            server: Some("https://mail.example.com".to_string()),
            api_key: Some("k".to_string()),
            insecure: true,
            ..CheckConfig::default()
        };
        let config = MailcowClientConfig::try_from(&check).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(config.insecure);

        check.api_key = None;
        assert!(MailcowClientConfig::try_from(&check).is_err());
    }

    #[tokio::test]
    async fn test_fetch_history_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/get/logs/rspamd-history/50"))
            .and(header("X-API-Key", "test-key"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"action": "greylist", "unix_time": 1700000100},
                {"action": "no action", "unix_time": 1700000000}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let entries = client_for(&server).fetch_history(50).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, Action::Greylist);
        assert_eq!(entries[1].timestamp, 1700000000);
    }

    #[tokio::test]
    async fn test_fetch_history_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_history(10).await.unwrap_err();
        match err {
            Error::Api(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("unauthorized"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_history_mailcow_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"type": "error", "msg": "authentication failed"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_history(10).await.unwrap_err();
        assert!(matches!(err, Error::Api(msg) if msg == "authentication failed"));
    }

    #[tokio::test]
    async fn test_fetch_history_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_history(10).await.unwrap_err();
        assert!(matches!(err, Error::MalformedHistory(_)));
    }

    #[tokio::test]
    async fn test_fetch_history_connection_refused() {
        let client = MailcowClient::new(MailcowClientConfig {
            server: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 2,
            insecure: false,
        })
        .unwrap();

        let err = client.fetch_history(10).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
