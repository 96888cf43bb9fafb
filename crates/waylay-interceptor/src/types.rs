//! Wire-shaped data model for interception and response merging.
//!
//! These types mirror the JSON shapes the mapping configuration produces
//! and the browser adapter consumes. Header maps keep their keys exactly
//! as supplied; no case folding is applied anywhere.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status value as supplied by mapping configuration.
///
/// Mapping files use both numeric codes and opaque strings, so both are
/// accepted and round-tripped unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Code(u16),
    Text(String),
}

impl From<u16> for StatusValue {
    fn from(code: u16) -> Self {
        StatusValue::Code(code)
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusValue::Code(code) => write!(f, "{code}"),
            StatusValue::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Instruction to replay a request against a (possibly different) target
/// before returning to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Override {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Canned response definition for a matched request.
///
/// Every field is optional; whatever is absent falls back to live upstream
/// data during a full merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Reference to a dynamically resolved transform; only honored when
    /// `content_type` carries the transform marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_ref: Option<String>,
}

/// Final reconciled response handed back to the browser.
///
/// The body is always the on-the-wire representation: raw text for
/// non-JSON payloads, canonical JSON text for JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Continue-parameters for a request the browser should re-issue with
/// substituted fields. The body is already serialized to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueParams {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// What the mapping subsystem sees of an intercepted request.
#[derive(Debug, Clone, Default)]
pub struct RequestFacts {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}
