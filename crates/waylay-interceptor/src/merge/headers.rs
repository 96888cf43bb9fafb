//! Header reconciliation.

use std::collections::HashMap;

/// Right-biased union of header maps.
///
/// Starts from the upstream headers and overlays the mock headers key by
/// key: every key the mock defines wins, keys only the upstream defines
/// are preserved. Keys are compared exactly as supplied.
pub(super) fn merge_headers(
    upstream: &HashMap<String, String>,
    mock: Option<&HashMap<String, String>>,
) -> HashMap<String, String> {
    let mut merged = upstream.clone();
    if let Some(mock) = mock {
        for (key, value) in mock {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
