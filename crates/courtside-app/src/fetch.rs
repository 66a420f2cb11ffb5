// Upstream HTTP access.
//
// Every refresh task asks a `JsonFetcher` for one JSON document. The real
// implementation talks to ESPN (optionally through a CORS relay that wraps
// the body as `{ "contents": "<json text>" }`); tests substitute a stub.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use courtside_core::config::ApiConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {message}")]
    Body { url: String, message: String },

    #[error("relay response for {url} is unusable: {message}")]
    Relay { url: String, message: String },

    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// One upstream document to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    /// Route the request through the configured relay.
    pub relay: bool,
}

impl Endpoint {
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            relay: false,
        }
    }

    pub fn relayed(url: impl Into<String>, relay: bool) -> Self {
        Self {
            url: url.into(),
            relay,
        }
    }
}

#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    relay_url: String,
}

impl HttpFetcher {
    pub fn from_config(api: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(api.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(api.timeout_secs),
            relay_url: api.relay_url.clone(),
        })
    }

    /// The URL actually requested: the target itself, or the relay with the
    /// target passed as its `url` query parameter.
    pub fn request_url(&self, endpoint: &Endpoint) -> Result<Url, FetchError> {
        let parsed = if endpoint.relay {
            Url::parse_with_params(&self.relay_url, &[("url", endpoint.url.as_str())])
        } else {
            Url::parse(&endpoint.url)
        };
        parsed.map_err(|e| FetchError::InvalidUrl {
            url: endpoint.url.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn get_json(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let url = self.request_url(endpoint)?;
        debug!(target_url = %endpoint.url, relay = endpoint.relay, "fetching");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: endpoint.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: endpoint.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|source| FetchError::Network {
            url: endpoint.url.clone(),
            source,
        })?;
        let body: Value = serde_json::from_str(&text).map_err(|e| FetchError::Body {
            url: endpoint.url.clone(),
            message: e.to_string(),
        })?;

        if endpoint.relay {
            unwrap_relay(body).map_err(|message| FetchError::Relay {
                url: endpoint.url.clone(),
                message,
            })
        } else {
            Ok(body)
        }
    }
}

/// Pull the wrapped document out of a relay response. The relay reports the
/// upstream status alongside the text; a non-2xx upstream is an error.
pub fn unwrap_relay(body: Value) -> Result<Value, String> {
    if let Some(code) = body
        .pointer("/status/http_code")
        .and_then(Value::as_u64)
        .filter(|code| !(200..300).contains(code))
    {
        return Err(format!("upstream returned HTTP {code}"));
    }

    let contents = body
        .get("contents")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing `contents` string".to_string())?;
    serde_json::from_str(contents).map_err(|e| format!("wrapped body is not JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fetcher() -> HttpFetcher {
        HttpFetcher {
            client: Client::new(),
            timeout: Duration::from_secs(5),
            relay_url: "https://api.allorigins.win/get".into(),
        }
    }

    #[test]
    fn unwraps_relay_contents() {
        let body = json!({
            "contents": "{\"events\":[]}",
            "status": { "http_code": 200 }
        });
        assert_eq!(unwrap_relay(body).unwrap(), json!({ "events": [] }));
    }

    #[test]
    fn relay_without_contents_is_an_error() {
        assert!(unwrap_relay(json!({ "status": {} })).is_err());
        assert!(unwrap_relay(json!({ "contents": null })).is_err());
    }

    #[test]
    fn relay_with_non_json_contents_is_an_error() {
        let err = unwrap_relay(json!({ "contents": "<html>oops</html>" })).unwrap_err();
        assert!(err.contains("not JSON"));
    }

    #[test]
    fn relay_reporting_upstream_failure_is_an_error() {
        let body = json!({ "contents": "{}", "status": { "http_code": 503 } });
        assert_eq!(unwrap_relay(body).unwrap_err(), "upstream returned HTTP 503");
    }

    #[test]
    fn relayed_request_url_encodes_target() {
        let endpoint = Endpoint::relayed("https://site.api.espn.com/teams/57?x=1&y=2", true);
        let url = fetcher().request_url(&endpoint).unwrap();
        assert_eq!(url.host_str(), Some("api.allorigins.win"));
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(value, "https://site.api.espn.com/teams/57?x=1&y=2");
    }

    #[test]
    fn direct_request_url_is_unchanged() {
        let endpoint = Endpoint::direct("https://api.open-meteo.com/v1/forecast?latitude=1");
        let url = fetcher().request_url(&endpoint).unwrap();
        assert_eq!(url.as_str(), "https://api.open-meteo.com/v1/forecast?latitude=1");
    }
}
