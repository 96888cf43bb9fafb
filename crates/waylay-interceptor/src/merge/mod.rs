//! The response merge engine.
//!
//! Combines an optional redirect override, the live result of replaying
//! the request upstream, and an optional canned mock response into the
//! single answer handed back to the browser. Presence of the two mapping
//! products drives a four-way dispatch; when both are present, the merge
//! reconciles status, content type, headers and body field by field, with
//! the mock side winning wherever it speaks.

mod body;
mod headers;

pub use body::BodyShape;

use crate::mapping::{TransformError, TransformResolver};
use crate::replay::ReplayClient;
use crate::types::{ContinueParams, MergedResponse, MockResponse, Override, StatusValue};
use body::{merge_body, serialize_value};
use headers::merge_headers;
use tracing::{debug, warn};

/// Content-type marker that routes a mock response through a transform.
pub const TRANSFORM_MARKER: &str = "file";

/// Header key carrying the upstream content type. Exact-key lookup:
/// received header names are lowercase on the wire in hyper.
const CONTENT_TYPE_HEADER: &str = "content-type";

/// Which of the two mapping products are present for a request.
///
/// The explicit variant (rather than nested option checks) keeps all four
/// branches exhaustively testable.
#[derive(Debug)]
pub enum MergeInputs {
    Neither,
    OverrideOnly(Override),
    MockOnly(MockResponse),
    Both(Override, MockResponse),
}

impl MergeInputs {
    pub fn classify(overrides: Option<Override>, mock: Option<MockResponse>) -> Self {
        match (overrides, mock) {
            (None, None) => MergeInputs::Neither,
            (Some(overrides), None) => MergeInputs::OverrideOnly(overrides),
            (None, Some(mock)) => MergeInputs::MockOnly(mock),
            (Some(overrides), Some(mock)) => MergeInputs::Both(overrides, mock),
        }
    }
}

/// How to settle an intercepted request. Exactly one way per merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    /// Re-issue the request with substituted parameters.
    Continue(ContinueParams),
    /// Fulfill the request directly with this response.
    Respond(MergedResponse),
    /// Neither mapping product applies; continue unmodified.
    PassThrough,
}

/// Merge failures that must surface to the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// The merge engine. Holds the injected replay and transform capabilities;
/// carries no per-request state, so one engine serves all requests.
pub struct MergeEngine<R, T> {
    replay: R,
    transforms: T,
}

impl<R, T> MergeEngine<R, T>
where
    R: ReplayClient,
    T: TransformResolver,
{
    pub fn new(replay: R, transforms: T) -> Self {
        Self { replay, transforms }
    }

    /// Decide how to settle a request given the mapping products.
    ///
    /// Inputs are consumed, never mutated; the decision owns its data.
    pub async fn merge(
        &self,
        overrides: Option<Override>,
        mock: Option<MockResponse>,
    ) -> Result<MergeDecision, MergeError> {
        match MergeInputs::classify(overrides, mock) {
            MergeInputs::Neither => Ok(MergeDecision::PassThrough),
            MergeInputs::OverrideOnly(overrides) => {
                debug!(method = %overrides.method, url = %overrides.url, "continuing with override parameters");
                Ok(MergeDecision::Continue(continue_params(overrides)))
            }
            MergeInputs::MockOnly(mock) => {
                let response = self.mock_only_response(mock)?;
                Ok(MergeDecision::Respond(response))
            }
            MergeInputs::Both(overrides, mock) => {
                let response = self.full_merge(&overrides, mock).await?;
                Ok(MergeDecision::Respond(response))
            }
        }
    }

    /// Mock-present, override-absent path: no replay, serialize and return.
    fn mock_only_response(&self, mock: MockResponse) -> Result<MergedResponse, MergeError> {
        if let Some(transformed) = self.apply_transform(&mock, true)? {
            return Ok(transformed);
        }
        Ok(serialize_mock(mock))
    }

    /// Both present: replay live, then reconcile field by field.
    async fn full_merge(
        &self,
        overrides: &Override,
        mock: MockResponse,
    ) -> Result<MergedResponse, MergeError> {
        let result = self.replay.replay(overrides).await;

        // The transform escape hatch discards the merged fields entirely.
        // After a replay the transform body is passed through unserialized.
        if let Some(transformed) = self.apply_transform(&mock, false)? {
            return Ok(transformed);
        }

        let upstream = match result.into_payload() {
            Some(payload) => payload,
            None => {
                // Network-level failure with no error response: degrade to
                // the mock's own data. Never fatal.
                warn!(url = %overrides.url, "replay yielded no payload, serving mock data only");
                return Ok(serialize_mock(mock));
            }
        };

        let content_type = mock
            .content_type
            .clone()
            .or_else(|| upstream.headers.get(CONTENT_TYPE_HEADER).cloned());
        let status = mock
            .status
            .clone()
            .or_else(|| upstream.status.map(StatusValue::Code));
        let merged_headers = merge_headers(&upstream.headers, mock.headers.as_ref());
        let merged_body = merge_body(upstream.body.as_ref(), mock.body.as_ref());

        Ok(MergedResponse {
            status,
            headers: merged_headers,
            content_type,
            body: Some(merged_body),
        })
    }

    /// Resolve and invoke the transform when the mock asks for one.
    ///
    /// `serialize_body` preserves the observed asymmetry between the two
    /// call sites: without a replay the transform body gets the uniform
    /// serialization rule; after a replay it is emitted as the value's
    /// exact JSON text.
    fn apply_transform(
        &self,
        mock: &MockResponse,
        serialize_body: bool,
    ) -> Result<Option<MergedResponse>, MergeError> {
        if mock.content_type.as_deref() != Some(TRANSFORM_MARKER) {
            return Ok(None);
        }
        let Some(reference) = mock.transform_ref.as_deref() else {
            return Ok(None);
        };

        let transform = self.transforms.resolve(reference)?;
        let output = transform();
        debug!(reference, "transform replaced merged response");

        let body = output.body.as_ref().map(|value| {
            if serialize_body {
                serialize_value(value)
            } else {
                value.to_string()
            }
        });

        Ok(Some(MergedResponse {
            status: output.status,
            headers: output.headers,
            content_type: output.content_type,
            body,
        }))
    }
}

/// Serialize a mock response to its on-the-wire form without merging.
fn serialize_mock(mock: MockResponse) -> MergedResponse {
    MergedResponse {
        status: mock.status,
        headers: mock.headers.unwrap_or_default(),
        content_type: mock.content_type,
        body: mock.body.as_ref().map(serialize_value),
    }
}

/// Serialize an override to the continue-parameters the browser replays.
fn continue_params(overrides: Override) -> ContinueParams {
    let body = overrides.body.as_ref().map(serialize_value);
    ContinueParams {
        method: overrides.method,
        url: overrides.url,
        headers: overrides.headers,
        body,
    }
}
