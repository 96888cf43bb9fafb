//! Pooled hyper client that replays intercepted requests upstream.
//!
//! Connection pooling, timeouts and TLS behavior are driven by
//! [`ReplayConfig`]; the rest of the crate only sees [`ReplayClient`].

use super::tls::NoVerifier;
use super::{ReplayClient, UpstreamPayload, UpstreamResult};
use crate::config::ReplayConfig;
use crate::types::Override;
use async_trait::async_trait;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{HeaderMap, Method, Request, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Type alias for the pooled HTTP client used for replays.
type PooledClient = Client<
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    BoxBody<Bytes, hyper::Error>,
>;

/// Production [`ReplayClient`] backed by a shared hyper connection pool.
pub struct HyperReplayClient {
    client: PooledClient,
    request_timeout: Duration,
}

impl HyperReplayClient {
    /// Create a replay client with connection pooling per the config.
    pub fn new(config: &ReplayConfig) -> Self {
        let mut http_connector = hyper_util::client::legacy::connect::HttpConnector::new();
        http_connector.set_keepalive(Some(Duration::from_secs(config.keepalive_timeout_secs)));
        http_connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        http_connector.enforce_http(false); // Allow both HTTP and HTTPS

        let https_connector = if config.tls_skip_verify {
            warn!("TLS certificate verification DISABLED for replays (development/testing only)");
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_tls_config(
                    rustls::ClientConfig::builder()
                        .dangerous()
                        .with_custom_certificate_verifier(Arc::new(NoVerifier))
                        .with_no_client_auth(),
                )
                .https_or_http()
                .enable_http1()
                .wrap_connector(http_connector)
        } else {
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .expect("Failed to load native root certificates")
                .https_or_http()
                .enable_http1()
                .wrap_connector(http_connector)
        };

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build(https_connector);

        debug!(
            "Replay pool configured (HTTP/1.1): max_idle={}, idle_timeout={}s, keepalive={}s",
            config.max_idle_per_host, config.idle_timeout_secs, config.keepalive_timeout_secs
        );

        Self {
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Build the hyper request for a replay, or nothing if the override does
/// not describe a performable request.
fn build_request(request: &Override) -> Option<Request<BoxBody<Bytes, hyper::Error>>> {
    let method = match request.method.parse::<Method>() {
        Ok(method) => method,
        Err(_) => {
            warn!(method = %request.method, "invalid method in override, replay skipped");
            return None;
        }
    };
    let uri = match request.url.parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            warn!(url = %request.url, "invalid URL in override, replay skipped: {e}");
            return None;
        }
    };

    let mut upstream_req = Request::builder().method(method).uri(uri);

    // Copy headers (skip host, the connector sets it)
    for (key, value) in &request.headers {
        if !key.eq_ignore_ascii_case("host") {
            upstream_req = upstream_req.header(key.as_str(), value.as_str());
        }
    }

    let body_bytes = match &request.body {
        Some(value) => Bytes::from(serde_json::to_string(value).unwrap_or_default()),
        None => Bytes::new(),
    };

    match upstream_req.body(BoxBody::new(
        Full::new(body_bytes).map_err(|never: Infallible| match never {}),
    )) {
        Ok(req) => Some(req),
        Err(e) => {
            warn!("failed to build replay request: {e}");
            None
        }
    }
}

#[async_trait]
impl ReplayClient for HyperReplayClient {
    async fn replay(&self, request: &Override) -> UpstreamResult {
        let Some(upstream_req) = build_request(request) else {
            return UpstreamResult::Failed { response: None };
        };

        debug!(method = %request.method, url = %request.url, "replaying request upstream");

        let outcome = tokio::time::timeout(self.request_timeout, self.client.request(upstream_req))
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(url = %request.url, "replay failed: {e}");
                return UpstreamResult::Failed { response: None };
            }
            Err(_) => {
                warn!(
                    url = %request.url,
                    "replay timed out after {}s",
                    self.request_timeout.as_secs()
                );
                return UpstreamResult::Failed { response: None };
            }
        };

        let status = response.status();
        let (parts, body) = response.into_parts();
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(url = %request.url, "failed to collect replay response body: {e}");
                return UpstreamResult::Failed { response: None };
            }
        };

        let payload = UpstreamPayload {
            status: Some(status.as_u16()),
            headers: collect_headers(&parts.headers),
            body: decode_body(&body_bytes),
        };

        // Mirror the classic HTTP-client contract the merge expects: an
        // error status is a failure that still carries its response.
        if status.is_success() {
            UpstreamResult::Ok(payload)
        } else {
            debug!(url = %request.url, status = status.as_u16(), "replay returned error status");
            UpstreamResult::Failed {
                response: Some(payload),
            }
        }
    }
}

/// Flatten a hyper header map into the string map the merge operates on.
/// Received header names are already lowercase on the wire in hyper.
fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(key, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (key.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Decode a response body: JSON text becomes a value, anything else stays
/// an opaque string. Empty bodies decode to nothing.
fn decode_body(bytes: &Bytes) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(text.into_owned())),
    }
}
