//! Message dispatcher: the engine's side of the client channel.
//!
//! Inbound messages arrive as raw JSON (the channel carries
//! `{ "type": ..., ... }` objects); replies, when a message warrants one,
//! go back over the oneshot reply port the sender attached. Malformed or
//! unrecognized input is ignored — a misbehaving client must not be able
//! to wedge the engine.

use shelter_core::{ClientMessage, Notification};
use tokio::sync::oneshot;

use crate::engine::Engine;

/// Reply half of a request/reply exchange.
pub type ReplyPort = oneshot::Sender<ClientMessage>;

impl Engine {
    /// Handle one inbound message.
    ///
    /// Infallible by design: every failure path is logged and absorbed.
    pub async fn handle_message(&self, raw: serde_json::Value, reply: Option<ReplyPort>) {
        let message: ClientMessage = match serde_json::from_value(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed client message");
                return;
            }
        };

        match message {
            ClientMessage::SkipWaiting => {
                if let Err(e) = self.skip_waiting().await {
                    tracing::warn!(error = %e, "skip-waiting command failed");
                }
            }

            ClientMessage::ClearCache => {
                let cleared = match self.data_partition().await {
                    Ok(partition) => match partition.clear().await {
                        Ok(deleted) => {
                            tracing::info!(deleted, "data partition cleared");
                            true
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "clear-cache failed");
                            false
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "data partition unavailable");
                        false
                    }
                };
                send_reply(reply, ClientMessage::CacheCleared { cleared, timestamp: now() });
            }

            ClientMessage::GetCacheStatus => {
                let partitions = self.cache_status().await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "cache status query failed");
                    Vec::new()
                });
                send_reply(reply, ClientMessage::CacheStatus { partitions, timestamp: now() });
            }

            ClientMessage::Push { title, body } => {
                let notification = Notification::with_open_dismiss(title, body);
                let recipients = self
                    .hub
                    .broadcast(ClientMessage::Notification { notification })
                    .await;
                tracing::debug!(recipients = recipients.len(), "push notification rendered");
            }

            ClientMessage::NotificationClick { action } => match action.as_str() {
                "open" => {
                    let outcome = self.hub.focus_or_open(&self.config.app_scope).await;
                    tracing::debug!(?outcome, "notification opened application window");
                }
                "dismiss" => {}
                other => tracing::debug!(action = %other, "ignoring unknown notification action"),
            },

            // engine-to-client kinds are not valid commands
            other => tracing::debug!(?other, "ignoring non-command message"),
        }
    }
}

fn send_reply(reply: Option<ReplyPort>, message: ClientMessage) {
    if let Some(port) = reply {
        // receiver may have gone away; that's the sender's problem
        let _ = port.send(message);
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
