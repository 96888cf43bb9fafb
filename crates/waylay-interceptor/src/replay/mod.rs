//! Upstream replay capability.
//!
//! Replaying an intercepted request against the real endpoint is the only
//! I/O the merge engine depends on. The capability is injected as a trait
//! so the engine can be driven with scripted results in tests; the
//! production implementation is [`HyperReplayClient`].

mod client;
mod tls;

pub use client::HyperReplayClient;

use crate::types::Override;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Payload observed from an upstream attempt.
///
/// Both a successful response and the error response of a failed attempt
/// normalize to this shape.
#[derive(Debug, Clone, Default)]
pub struct UpstreamPayload {
    pub status: Option<u16>,
    pub headers: HashMap<String, String>,
    /// Raw body, not yet classified: JSON response text is decoded to a
    /// value, anything else arrives as `Value::String`.
    pub body: Option<Value>,
}

/// Outcome of replaying a request against the real endpoint.
#[derive(Debug, Clone)]
pub enum UpstreamResult {
    Ok(UpstreamPayload),
    /// The attempt failed; carries the upstream's error response when one
    /// exists, e.g. a 5xx with a body. Network-level failures carry none.
    Failed { response: Option<UpstreamPayload> },
}

impl UpstreamResult {
    /// Best-available payload regardless of success or failure.
    pub fn into_payload(self) -> Option<UpstreamPayload> {
        match self {
            UpstreamResult::Ok(payload) => Some(payload),
            UpstreamResult::Failed { response } => response,
        }
    }
}

/// Capability that performs the live request.
///
/// Failures are data, not errors: a replay that cannot produce any payload
/// returns `UpstreamResult::Failed { response: None }` and the merge
/// degrades gracefully.
#[async_trait]
pub trait ReplayClient: Send + Sync {
    async fn replay(&self, request: &Override) -> UpstreamResult;
}
