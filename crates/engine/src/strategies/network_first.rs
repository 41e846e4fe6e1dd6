//! Network-first executor: dynamic data endpoints.
//!
//! Data must be as fresh as the network allows, so the fetch always runs
//! first; the data partition is a fallback for when it doesn't. Serving
//! stale data is announced to every controlled client, and a background
//! sync is registered so the client refreshes once connectivity returns.

use shelter_core::{RequestKey, ResponseSnapshot};

use crate::engine::Engine;

impl Engine {
    pub(crate) async fn network_first(&self, request: &RequestKey) -> ResponseSnapshot {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.status == 200 {
                    match self.data_partition().await {
                        Ok(partition) => {
                            if let Err(e) = partition.put_entry(request, &response).await {
                                tracing::warn!(error = %e, url = %request.url, "failed to cache data response");
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "data partition unavailable"),
                    }
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "network-first fetch failed, trying cache");
                self.data_fallback(request).await
            }
        }
    }

    async fn data_fallback(&self, request: &RequestKey) -> ResponseSnapshot {
        let cached = match self.data_partition().await {
            Ok(partition) => partition.match_entry(request).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "data partition lookup failed");
                None
            }),
            Err(e) => {
                tracing::warn!(error = %e, "data partition unavailable");
                None
            }
        };

        match cached {
            Some(entry) => {
                self.notify_cache_used(&request.url).await;
                self.register_pending_sync().await;
                entry
            }
            None => ResponseSnapshot::offline_error("network unreachable and no cached data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::engine::Engine;
    use crate::testutil::{MockNetwork, test_config};
    use shelter_core::{CacheDb, ClientMessage, RequestKey, ResponseSnapshot};

    const ITEMS_URL: &str = "https://api.example.com/rest/v1/items";

    async fn engine_with(network: Arc<MockNetwork>) -> Engine {
        let store = CacheDb::open_in_memory().await.unwrap();
        Engine::new(test_config(), store, network)
    }

    fn items(body: &str) -> ResponseSnapshot {
        ResponseSnapshot::new(200, vec![("content-type".into(), "application/json".into())], body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_live_response_is_stored_and_returned() {
        let network = MockNetwork::new();
        network.respond(ITEMS_URL, items(r#"[{"id":1}]"#));
        let engine = engine_with(network.clone()).await;

        let request = RequestKey::get(ITEMS_URL);
        let response = engine.handle_request(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"[{"id":1}]"#);
        assert!(response.stored_at.is_none()); // live, not cached
        assert_eq!(network.call_count(), 1);

        let stored = engine
            .data_partition()
            .await
            .unwrap()
            .match_entry(&request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, br#"[{"id":1}]"#);
    }

    #[tokio::test]
    async fn test_network_always_consulted_even_when_cached() {
        let network = MockNetwork::new();
        network.respond(ITEMS_URL, items("v1"));
        let engine = engine_with(network.clone()).await;

        let request = RequestKey::get(ITEMS_URL);
        engine.handle_request(&request).await.unwrap();

        network.respond(ITEMS_URL, items("v2"));
        let response = engine.handle_request(&request).await.unwrap();
        assert_eq!(response.body, b"v2");
        assert_eq!(network.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_cache_with_notification() {
        let network = MockNetwork::new();
        network.respond(ITEMS_URL, items("fresh"));
        let engine = engine_with(network.clone()).await;
        let (_id, mut rx) = engine.clients().subscribe().await;
        engine.clients().claim_all().await;

        let request = RequestKey::get(ITEMS_URL);
        engine.handle_request(&request).await.unwrap(); // populate

        network.set_offline(true);
        let response = engine.handle_request(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"fresh");
        assert!(response.stored_at.is_some());

        // exactly one cache-used notification
        match rx.try_recv().unwrap() {
            ClientMessage::CacheUsed { url, timestamp } => {
                assert_eq!(url, ITEMS_URL);
                assert!(!timestamp.is_empty());
            }
            other => panic!("expected cache-used, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_without_cache_synthesizes_offline_503() {
        let network = MockNetwork::new();
        network.set_offline(true);
        let engine = engine_with(network).await;

        let request = RequestKey::get(ITEMS_URL);
        let response = engine.handle_request(&request).await.unwrap();
        assert_eq!(response.status, 503);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["offline"], serde_json::json!(true));
        assert!(body["timestamp"].as_str().is_some());
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_fallback_registers_background_sync() {
        let network = MockNetwork::new();
        network.respond(ITEMS_URL, items("data"));
        let engine = engine_with(network.clone()).await;
        let (_id, mut rx) = engine.clients().subscribe().await;
        engine.clients().claim_all().await;

        let request = RequestKey::get(ITEMS_URL);
        engine.handle_request(&request).await.unwrap();

        network.set_offline(true);
        engine.handle_request(&request).await.unwrap();
        let _ = rx.try_recv(); // cache-used

        network.set_offline(false);
        let tags = engine.connectivity_restored().await;
        assert_eq!(tags.len(), 1);
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::BackgroundSync { tag: tags[0].clone() });
    }

    #[tokio::test]
    async fn test_non_200_data_response_not_cached() {
        let network = MockNetwork::new();
        network.respond(ITEMS_URL, ResponseSnapshot::new(500, vec![], b"boom".to_vec()));
        let engine = engine_with(network).await;

        let request = RequestKey::get(ITEMS_URL);
        let response = engine.handle_request(&request).await.unwrap();
        assert_eq!(response.status, 500);

        let miss = engine
            .data_partition()
            .await
            .unwrap()
            .match_entry(&request)
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
