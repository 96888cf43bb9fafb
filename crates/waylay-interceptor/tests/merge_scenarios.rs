//! End-to-end interception scenarios driven through `handle_request`,
//! with scripted replay, mapping and transform capabilities.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use waylay_interceptor::intercept::{handle_request, BrowserRequest};
use waylay_interceptor::mapping::{
    MappingProvider, Transform, TransformError, TransformOutput, TransformResolver,
};
use waylay_interceptor::merge::MergeEngine;
use waylay_interceptor::replay::{ReplayClient, UpstreamPayload, UpstreamResult};
use waylay_interceptor::types::{
    ContinueParams, MergedResponse, MockResponse, Override, RequestFacts, StatusValue,
};

struct ScriptedReplay(UpstreamResult);

#[async_trait]
impl ReplayClient for ScriptedReplay {
    async fn replay(&self, _request: &Override) -> UpstreamResult {
        self.0.clone()
    }
}

/// Mapping keyed by exact URL, the way a pattern-matched config behaves.
#[derive(Default)]
struct UrlMapping {
    overrides: HashMap<String, Override>,
    mocks: HashMap<String, MockResponse>,
}

#[async_trait]
impl MappingProvider for UrlMapping {
    async fn lookup_override(&self, request: &RequestFacts) -> Option<Override> {
        self.overrides.get(&request.url).cloned()
    }

    async fn lookup_mock_response(&self, request: &RequestFacts) -> Option<MockResponse> {
        self.mocks.get(&request.url).cloned()
    }
}

/// Transform registry backed by a closure table.
struct TransformTable(HashMap<String, TransformOutput>);

impl TransformResolver for TransformTable {
    fn resolve(&self, reference: &str) -> Result<Transform, TransformError> {
        let output = self
            .0
            .get(reference)
            .cloned()
            .ok_or_else(|| TransformError::new(reference, "unknown transform"))?;
        Ok(Box::new(move || output.clone()))
    }
}

struct PausedRequest {
    url: String,
    continued_with: Option<ContinueParams>,
    continued_unmodified: bool,
    fulfilled: Option<MergedResponse>,
}

impl PausedRequest {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            continued_with: None,
            continued_unmodified: false,
            fulfilled: None,
        }
    }
}

#[async_trait]
impl BrowserRequest for PausedRequest {
    fn is_resolution_handled(&self) -> bool {
        false
    }

    fn facts(&self) -> RequestFacts {
        RequestFacts {
            method: "GET".to_string(),
            url: self.url.clone(),
            headers: HashMap::new(),
            body: None,
        }
    }

    async fn continue_with(&mut self, params: ContinueParams) -> anyhow::Result<()> {
        self.continued_with = Some(params);
        Ok(())
    }

    async fn continue_unmodified(&mut self) -> anyhow::Result<()> {
        self.continued_unmodified = true;
        Ok(())
    }

    async fn fulfill(&mut self, response: MergedResponse) -> anyhow::Result<()> {
        self.fulfilled = Some(response);
        Ok(())
    }
}

fn booking_override() -> Override {
    Override {
        method: "GET".to_string(),
        url: "https://real-api.test/bookings".to_string(),
        headers: HashMap::new(),
        body: None,
    }
}

#[tokio::test]
async fn overridden_request_merges_live_and_mock_data() {
    let upstream = UpstreamPayload {
        status: Some(200),
        headers: HashMap::from([
            ("content-type".to_string(), "application/json".to_string()),
            ("x-upstream".to_string(), "live".to_string()),
        ]),
        body: Some(json!({"bookingId": "b-17", "state": "CONFIRMED"})),
    };
    let engine = MergeEngine::new(
        ScriptedReplay(UpstreamResult::Ok(upstream)),
        TransformTable(HashMap::new()),
    );

    let mut mapping = UrlMapping::default();
    let url = "https://app.test/api/bookings";
    mapping.overrides.insert(url.to_string(), booking_override());
    mapping.mocks.insert(
        url.to_string(),
        MockResponse {
            headers: Some(HashMap::from([(
                "x-mocked".to_string(),
                "true".to_string(),
            )])),
            body: Some(json!({"state": "CANCELLED"})),
            ..Default::default()
        },
    );

    let mut request = PausedRequest::new(url);
    handle_request(&mut request, &mapping, &engine).await.unwrap();

    let response = request.fulfilled.expect("request should be fulfilled");
    assert_eq!(response.status, Some(StatusValue::Code(200)));
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.headers.get("x-upstream").map(String::as_str), Some("live"));
    assert_eq!(response.headers.get("x-mocked").map(String::as_str), Some("true"));

    let body: serde_json::Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"bookingId": "b-17", "state": "CANCELLED"}));
}

#[tokio::test]
async fn list_responses_merge_element_wise() {
    let engine = MergeEngine::new(
        ScriptedReplay(UpstreamResult::Ok(UpstreamPayload {
            status: Some(200),
            headers: HashMap::new(),
            body: Some(json!([
                {"id": 1, "name": "first"},
                {"id": 2, "name": "second"}
            ])),
        })),
        TransformTable(HashMap::new()),
    );

    let url = "https://app.test/api/items";
    let mut mapping = UrlMapping::default();
    mapping.overrides.insert(url.to_string(), booking_override());
    mapping.mocks.insert(
        url.to_string(),
        MockResponse {
            body: Some(json!([{"name": "renamed"}])),
            ..Default::default()
        },
    );

    let mut request = PausedRequest::new(url);
    handle_request(&mut request, &mapping, &engine).await.unwrap();

    let response = request.fulfilled.expect("request should be fulfilled");
    let body: serde_json::Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        json!([
            {"id": 1, "name": "renamed"},
            {"id": 2, "name": "second"}
        ])
    );
}

#[tokio::test]
async fn html_responses_are_never_rewritten() {
    let engine = MergeEngine::new(
        ScriptedReplay(UpstreamResult::Ok(UpstreamPayload {
            status: Some(200),
            headers: HashMap::from([(
                "content-type".to_string(),
                "text/html".to_string(),
            )]),
            body: Some(serde_json::Value::String("<html><body>live</body></html>".to_string())),
        })),
        TransformTable(HashMap::new()),
    );

    let url = "https://app.test/page";
    let mut mapping = UrlMapping::default();
    mapping.overrides.insert(url.to_string(), booking_override());
    mapping.mocks.insert(
        url.to_string(),
        MockResponse {
            body: Some(json!({"ignored": true})),
            ..Default::default()
        },
    );

    let mut request = PausedRequest::new(url);
    handle_request(&mut request, &mapping, &engine).await.unwrap();

    let response = request.fulfilled.expect("request should be fulfilled");
    assert_eq!(
        response.body.as_deref(),
        Some("<html><body>live</body></html>")
    );
    assert_eq!(response.content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn transform_produces_the_entire_response() {
    let transforms = TransformTable(HashMap::from([(
        "fixtures/receipt".to_string(),
        TransformOutput {
            status: Some(StatusValue::Code(201)),
            headers: HashMap::from([("x-transformed".to_string(), "yes".to_string())]),
            body: Some(json!({"receipt": "r-99"})),
            content_type: Some("application/json".to_string()),
        },
    )]));
    let engine = MergeEngine::new(
        ScriptedReplay(UpstreamResult::Failed { response: None }),
        transforms,
    );

    let url = "https://app.test/api/receipts";
    let mut mapping = UrlMapping::default();
    mapping.overrides.insert(url.to_string(), booking_override());
    mapping.mocks.insert(
        url.to_string(),
        MockResponse {
            content_type: Some("file".to_string()),
            transform_ref: Some("fixtures/receipt".to_string()),
            ..Default::default()
        },
    );

    let mut request = PausedRequest::new(url);
    handle_request(&mut request, &mapping, &engine).await.unwrap();

    let response = request.fulfilled.expect("request should be fulfilled");
    assert_eq!(response.status, Some(StatusValue::Code(201)));
    assert_eq!(response.headers.get("x-transformed").map(String::as_str), Some("yes"));
    assert_eq!(response.body.as_deref(), Some(r#"{"receipt":"r-99"}"#));
}

#[tokio::test]
async fn unmatched_requests_pass_through_untouched() {
    let engine = MergeEngine::new(
        ScriptedReplay(UpstreamResult::Failed { response: None }),
        TransformTable(HashMap::new()),
    );
    let mapping = UrlMapping::default();

    let mut request = PausedRequest::new("https://app.test/unmapped");
    handle_request(&mut request, &mapping, &engine).await.unwrap();

    assert!(request.continued_unmodified);
    assert!(request.continued_with.is_none());
    assert!(request.fulfilled.is_none());
}
