//! Client-message protocol types.
//!
//! Messages cross the channel as tagged JSON objects: `{ "type": ..., ... }`.
//! Commands flow from clients to the engine (skip-waiting, clear-cache,
//! get-cache-status, push, notification-click); notifications flow from
//! the engine to clients (cache-used, background-sync, notification,
//! window-focus) and replies ride a dedicated reply port.

use serde::{Deserialize, Serialize};

/// Per-partition entry count reported by `cache-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStatus {
    pub name: String,
    pub entries: u64,
}

/// A rendered notification with actionable buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub actions: Vec<String>,
}

impl Notification {
    /// The standard open/dismiss notification the engine renders for
    /// inbound push events.
    pub fn with_open_dismiss(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), actions: vec!["open".into(), "dismiss".into()] }
    }
}

/// A tagged message exchanged over the client channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Command: force the waiting version to activate now.
    SkipWaiting,

    /// Command: empty the data partition. Acknowledged with `CacheCleared`.
    ClearCache,

    /// Command: report per-partition entry counts.
    GetCacheStatus,

    /// Reply to `GetCacheStatus`.
    CacheStatus { partitions: Vec<PartitionStatus>, timestamp: String },

    /// Reply to `ClearCache`.
    CacheCleared { cleared: bool, timestamp: String },

    /// Notification: a network-first fallback served from cache.
    CacheUsed { url: String, timestamp: String },

    /// Notification: run the client-side data sync for `tag`.
    BackgroundSync { tag: String },

    /// Inbound push event from the external push service.
    Push { title: String, body: String },

    /// Notification rendered for a push event.
    Notification { notification: Notification },

    /// A notification action was chosen by the user.
    NotificationClick { action: String },

    /// Notification: bring the client's window to the foreground.
    WindowFocus { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_waiting_wire_shape() {
        let json = serde_json::to_value(&ClientMessage::SkipWaiting).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "skip-waiting" }));
    }

    #[test]
    fn test_parse_clear_cache() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"clear-cache"}"#).unwrap();
        assert_eq!(msg, ClientMessage::ClearCache);
    }

    #[test]
    fn test_cache_used_round_trip() {
        let msg = ClientMessage::CacheUsed {
            url: "https://api.example.com/rest/v1/items".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"cache-used""#));
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"reticulate-splines"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_notification_default_actions() {
        let n = Notification::with_open_dismiss("Update", "New data available");
        assert_eq!(n.actions, vec!["open", "dismiss"]);
    }
}
