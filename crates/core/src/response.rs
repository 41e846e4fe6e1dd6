//! Stored response snapshots and the synthetic fallback responses.

use serde::{Deserialize, Serialize};

/// A response snapshot: what the store persists and what every strategy
/// executor resolves to.
///
/// `stored_at` is set when the snapshot was read back from a cache
/// partition; live network responses carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: Option<String>,
}

impl ResponseSnapshot {
    /// Build a snapshot from raw parts (live response, no stored_at).
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, stored_at: None }
    }

    /// Whether this response may be persisted (2xx only).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Synthetic 503 returned when network-first fails and the data
    /// partition has no matching entry.
    ///
    /// Body shape: `{ "error": ..., "offline": true, "timestamp": ISO8601 }`.
    pub fn offline_error(message: &str) -> Self {
        let body = serde_json::json!({
            "error": message,
            "offline": true,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        Self {
            status: 503,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string().into_bytes(),
            stored_at: None,
        }
    }

    /// Synthetic 404 returned when cache-first cannot resolve a
    /// subresource at all (network down, nothing cached).
    pub fn unavailable() -> Self {
        Self {
            status: 404,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: b"resource unavailable".to_vec(),
            stored_at: None,
        }
    }
}
