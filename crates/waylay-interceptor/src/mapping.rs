//! Capability interfaces supplied by the mapping subsystem.
//!
//! The mapping layer owns URL-pattern matching, mapping-config loading and
//! transform-function resolution. The merge engine only consumes its
//! products: an [`Override`], a [`MockResponse`], and resolved transforms.

use crate::types::{MockResponse, Override, RequestFacts, StatusValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only per-request lookups into the mapping configuration.
#[async_trait]
pub trait MappingProvider: Send + Sync {
    /// Override instruction applying to this request, if any.
    async fn lookup_override(&self, request: &RequestFacts) -> Option<Override>;

    /// Mock response definition applying to this request, if any.
    async fn lookup_mock_response(&self, request: &RequestFacts) -> Option<MockResponse>;
}

/// What a resolved transform produces when invoked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Zero-argument callable produced by [`TransformResolver::resolve`].
pub type Transform = Box<dyn Fn() -> TransformOutput + Send + Sync>;

/// Resolves a configured transform reference to a callable.
///
/// Resolution mechanics (file paths, registries) live entirely in the
/// mapping layer; the engine only invokes what comes back.
pub trait TransformResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<Transform, TransformError>;
}

/// Failure to resolve a configured transform reference.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve transform '{reference}': {message}")]
pub struct TransformError {
    pub reference: String,
    pub message: String,
}

impl TransformError {
    pub fn new(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            message: message.into(),
        }
    }
}
