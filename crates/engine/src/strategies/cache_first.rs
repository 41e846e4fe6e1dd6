//! Cache-first executor: static assets.
//!
//! Prefer the stored copy; go to the network only on a miss. A successful
//! same-origin miss resolution is written back so the asset is there next
//! time the network isn't; foreign-origin responses pass through uncached.

use shelter_core::{RequestKey, RequestMode, ResponseSnapshot};

use crate::engine::Engine;

impl Engine {
    pub(crate) async fn cache_first(&self, request: &RequestKey) -> ResponseSnapshot {
        let partition = match self.static_partition().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "static partition unavailable, going to network");
                return self.fetch_uncached(request).await;
            }
        };

        match partition.match_entry(request).await {
            Ok(Some(hit)) => {
                tracing::debug!(url = %request.url, "cache-first hit");
                return hit;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "cache lookup failed, going to network"),
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.status == 200 && self.is_same_origin(&request.url) {
                    if let Err(e) = partition.put_entry(request, &response).await {
                        tracing::warn!(error = %e, url = %request.url, "failed to cache response");
                    }
                } else if response.status == 200 {
                    tracing::debug!(url = %request.url, "cross-origin response not cached");
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "cache-first network failure");
                self.shell_fallback(request, &partition).await
            }
        }
    }

    /// Network fetch when the cache can't even be consulted.
    async fn fetch_uncached(&self, request: &RequestKey) -> ResponseSnapshot {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(_) => ResponseSnapshot::unavailable(),
        }
    }

    /// Offline fallback: document navigations get the application shell;
    /// everything else gets a synthetic 404.
    async fn shell_fallback(
        &self, request: &RequestKey, partition: &shelter_core::Partition,
    ) -> ResponseSnapshot {
        if request.mode != RequestMode::Navigation {
            return ResponseSnapshot::unavailable();
        }

        let shell = RequestKey::get(&self.config.fallback_document);
        match partition.match_entry(&shell).await {
            Ok(Some(document)) => {
                tracing::debug!(url = %request.url, "serving application shell for offline navigation");
                document
            }
            Ok(None) => {
                tracing::warn!("application shell not cached, offline navigation unavailable");
                ResponseSnapshot::unavailable()
            }
            Err(e) => {
                tracing::warn!(error = %e, "shell lookup failed");
                ResponseSnapshot::unavailable()
            }
        }
    }
}
