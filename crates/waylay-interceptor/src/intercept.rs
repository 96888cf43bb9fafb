//! Per-request interception orchestration.
//!
//! The browser-session layer (e.g. a CDP `Fetch.requestPaused` handler)
//! adapts each paused request to [`BrowserRequest`]; this module drives
//! the decision and applies it. Every request is settled independently,
//! with no state shared between in-flight requests.

use crate::mapping::{MappingProvider, TransformResolver};
use crate::merge::{MergeDecision, MergeEngine, MergeError};
use crate::replay::ReplayClient;
use crate::types::{ContinueParams, MergedResponse, RequestFacts, StatusValue};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error};

/// Adapter over one intercepted browser request.
///
/// Exactly one of the settle methods is called per request; all three are
/// terminal from the orchestrator's point of view.
#[async_trait]
pub trait BrowserRequest: Send {
    /// Whether another interception agent already settled this request.
    fn is_resolution_handled(&self) -> bool;

    /// Method, URL, headers and body of the intercepted request, as the
    /// mapping lookups see it.
    fn facts(&self) -> RequestFacts;

    /// Continue the request with substituted parameters.
    async fn continue_with(&mut self, params: ContinueParams) -> anyhow::Result<()>;

    /// Continue the request completely unmodified.
    async fn continue_unmodified(&mut self) -> anyhow::Result<()>;

    /// Fulfill the request directly with a fabricated response.
    async fn fulfill(&mut self, response: MergedResponse) -> anyhow::Result<()>;
}

/// Settle one intercepted request.
pub async fn handle_request<B, R, T>(
    request: &mut B,
    mapping: &dyn MappingProvider,
    engine: &MergeEngine<R, T>,
) -> anyhow::Result<()>
where
    B: BrowserRequest,
    R: ReplayClient,
    T: TransformResolver,
{
    if request.is_resolution_handled() {
        debug!("interception already settled upstream, skipping");
        return Ok(());
    }

    let facts = request.facts();
    let overrides = mapping.lookup_override(&facts).await;
    let mock = mapping.lookup_mock_response(&facts).await;

    match engine.merge(overrides, mock).await {
        Ok(MergeDecision::Continue(params)) => {
            debug!(url = %facts.url, "continuing with substituted parameters");
            request.continue_with(params).await
        }
        Ok(MergeDecision::Respond(response)) => {
            debug!(url = %facts.url, "fulfilling with merged response");
            request.fulfill(response).await
        }
        Ok(MergeDecision::PassThrough) => request.continue_unmodified().await,
        Err(error) => {
            error!(%error, url = %facts.url, "merge failed, serving generic failure response");
            request.fulfill(failure_response(&error)).await
        }
    }
}

/// Generic failure returned when the merge cannot produce a response.
fn failure_response(error: &MergeError) -> MergedResponse {
    MergedResponse {
        status: Some(StatusValue::Code(502)),
        headers: HashMap::from([(
            "content-type".to_string(),
            "application/json".to_string(),
        )]),
        content_type: Some("application/json".to_string()),
        body: Some(format!(r#"{{"error": "{error}"}}"#)),
    }
}
