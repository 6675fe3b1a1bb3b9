//! One conditional GET against the status endpoint.
//!
//! The client never touches the validator cache itself; it reads the
//! outgoing headers from it and hands fresh validators back in the outcome.
//! The caller decides whether to commit them.

use anyhow::{Context, Result};
use http::header::{HeaderName, ETAG, LAST_MODIFIED};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::validators::{ValidatorCache, Validators};
use crate::config::WatcherConfig;
use crate::error::FetchError;
use crate::events::summary::Summary;

/// A successfully decoded 200 response.
#[derive(Debug, Clone)]
pub struct StatusPayload {
    /// Untyped document, used for fingerprinting.
    pub raw: serde_json::Value,
    pub summary: Summary,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// 304: the server confirmed our validators still match.
    Unchanged,
    Changed {
        payload: StatusPayload,
        validators: Validators,
    },
    Unreachable(FetchError),
}

pub struct FetchClient {
    client: reqwest::Client,
    url: String,
}

impl FetchClient {
    pub fn new(config: &WatcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url: config.status_url.clone() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self, cache: &ValidatorCache) -> FetchOutcome {
        match self.try_fetch(cache.request_headers()).await {
            Ok(Some((payload, validators))) => FetchOutcome::Changed { payload, validators },
            Ok(None) => FetchOutcome::Unchanged,
            Err(e) => FetchOutcome::Unreachable(e),
        }
    }

    async fn try_fetch(
        &self,
        conditional: HeaderMap,
    ) -> Result<Option<(StatusPayload, Validators)>, FetchError> {
        let resp = self.client.get(&self.url).headers(conditional).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_MODIFIED {
            debug!("304 Not Modified");
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus { status });
        }

        let validators = extract_validators(resp.headers());
        let body = resp.bytes().await?;
        let payload = decode_payload(&body)?;

        debug!(
            bytes = body.len(),
            etag = ?validators.entity_tag,
            last_modified = ?validators.last_modified,
            "200 OK"
        );
        Ok(Some((payload, validators)))
    }
}

fn extract_validators(headers: &HeaderMap) -> Validators {
    let get = |name: HeaderName| -> Option<String> {
        headers.get(name)?.to_str().ok().map(str::to_string)
    };
    Validators {
        entity_tag: get(ETAG),
        last_modified: get(LAST_MODIFIED),
    }
}

/// Decode a response body into both an untyped and a typed view.
pub fn decode_payload(body: &[u8]) -> Result<StatusPayload, FetchError> {
    let raw: serde_json::Value = serde_json::from_slice(body)?;
    let summary = Summary::deserialize(&raw)?;
    Ok(StatusPayload { raw, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const BODY: &str = r#"{"incidents":[],"components":[{"id":"c1","name":"API","status":"operational"}]}"#;

    fn client_for(server: &MockServer) -> FetchClient {
        let config = WatcherConfig {
            status_url: format!("{}/api/v2/summary.json", server.uri()),
            request_timeout: Duration::from_millis(500),
            ..Default::default()
        };
        FetchClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_changed_returns_payload_and_validators() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/summary.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"v1\"")
                    .insert_header("Last-Modified", "Wed, 01 May 2024 12:00:00 GMT")
                    .set_body_raw(BODY, "application/json"),
            )
            .mount(&server)
            .await;

        match client_for(&server).fetch(&ValidatorCache::new()).await {
            FetchOutcome::Changed { payload, validators } => {
                assert_eq!(payload.summary.components.len(), 1);
                assert_eq!(validators.entity_tag.as_deref(), Some("\"v1\""));
                assert_eq!(
                    validators.last_modified.as_deref(),
                    Some("Wed, 01 May 2024 12:00:00 GMT")
                );
            }
            other => panic!("expected Changed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_modified_is_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("If-None-Match", "\"v1\""))
            .respond_with(ResponseTemplate::new(304))
            .expect(1)
            .mount(&server)
            .await;

        let mut cache = ValidatorCache::new();
        cache.update(Some("\"v1\"".into()), None);
        let outcome = client_for(&server).fetch(&cache).await;
        assert!(matches!(outcome, FetchOutcome::Unchanged));
    }

    #[tokio::test]
    async fn test_sends_only_if_none_match_when_both_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server)
            .await;

        let mut cache = ValidatorCache::new();
        cache.update(Some("\"v2\"".into()), Some("Wed, 01 May 2024 12:00:00 GMT".into()));
        client_for(&server).fetch(&cache).await;

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers.get("if-none-match").unwrap(), "\"v2\"");
        assert!(requests[0].headers.get("if-modified-since").is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        match client_for(&server).fetch(&ValidatorCache::new()).await {
            FetchOutcome::Unreachable(err) => {
                assert!(matches!(err, FetchError::UnexpectedStatus { status } if status == StatusCode::SERVICE_UNAVAILABLE));
                assert_eq!(err.kind(), ErrorKind::Transient);
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_is_non_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        match client_for(&server).fetch(&ValidatorCache::new()).await {
            FetchOutcome::Unreachable(err) => assert_eq!(err.kind(), ErrorKind::NonRetryable),
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"broken\"")
                    .set_body_raw("<html>maintenance</html>", "text/html"),
            )
            .mount(&server)
            .await;

        match client_for(&server).fetch(&ValidatorCache::new()).await {
            FetchOutcome::Unreachable(err) => assert!(matches!(err, FetchError::Decode(_))),
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(BODY, "application/json")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        match client_for(&server).fetch(&ValidatorCache::new()).await {
            FetchOutcome::Unreachable(err) => {
                assert!(matches!(err, FetchError::Transport(_)));
                assert_eq!(err.kind(), ErrorKind::Transient);
            }
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_payload_requires_summary_shape() {
        assert!(decode_payload(BODY.as_bytes()).is_ok());
        let err = decode_payload(br#"{"incidents": "none"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
