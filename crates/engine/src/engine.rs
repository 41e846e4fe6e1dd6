//! Engine construction, request entry point, and lifecycle operations.

use std::collections::BTreeSet;
use std::sync::Arc;

use shelter_core::{
    AppConfig, CacheDb, ClientMessage, Error, Partition, PartitionKind, PartitionStatus, RequestKey, ResponseSnapshot,
    VersionRegistry,
};
use shelter_client::{Network, net::same_origin};
use tokio::sync::Mutex;

use crate::clients::ClientHub;
use crate::lifecycle::{LifecycleController, LifecycleState};
use crate::router::{RoutingRules, Strategy, classify};

/// The request-interception engine.
///
/// Owns the cache store, the network primitive, the routing rules, the
/// lifecycle controller, and the client hub. Each instance is fully
/// configured at construction; nothing is module-global, so independently
/// configured engines can coexist.
pub struct Engine {
    pub(crate) config: AppConfig,
    pub(crate) registry: VersionRegistry,
    pub(crate) rules: RoutingRules,
    origin: Option<url::Url>,
    pub(crate) store: CacheDb,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) hub: ClientHub,
    pub(crate) lifecycle: LifecycleController,
    pending_syncs: Mutex<BTreeSet<String>>,
}

impl Engine {
    pub fn new(config: AppConfig, store: CacheDb, network: Arc<dyn Network>) -> Self {
        let registry = VersionRegistry::from_config(&config);
        let rules = RoutingRules::from_config(&config);
        let origin = url::Url::parse(&config.origin).ok();
        if origin.is_none() {
            tracing::warn!(origin = %config.origin, "unparseable origin, absolute URLs will not be cached");
        }
        Self {
            config,
            registry,
            rules,
            origin,
            store,
            network,
            hub: ClientHub::new(),
            lifecycle: LifecycleController::new(),
            pending_syncs: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn clients(&self) -> &ClientHub {
        &self.hub
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    /// Whether a request URL shares the configured origin. Origin-relative
    /// URLs always do; with an unparseable configured origin, every
    /// absolute URL counts as foreign.
    pub(crate) fn is_same_origin(&self, url: &str) -> bool {
        match &self.origin {
            Some(origin) => same_origin(origin, url),
            None => !url.contains("://"),
        }
    }

    pub(crate) async fn static_partition(&self) -> Result<Partition, Error> {
        self.store
            .open_partition(&self.config.static_partition, PartitionKind::StaticAssets)
            .await
    }

    pub(crate) async fn data_partition(&self) -> Result<Partition, Error> {
        self.store
            .open_partition(&self.config.data_partition, PartitionKind::DynamicData)
            .await
    }

    /// Resolve a request through its strategy.
    ///
    /// The cache-first and network-first arms always resolve to a
    /// response, absorbing network and store failures into fallbacks. A
    /// bypassed request is not intercepted, so its transport failure is
    /// the caller's to handle.
    pub async fn handle_request(&self, request: &RequestKey) -> Result<ResponseSnapshot, Error> {
        match classify(&self.rules, request) {
            Strategy::Bypass => self.network.fetch(request).await,
            Strategy::CacheFirst => Ok(self.cache_first(request).await),
            Strategy::NetworkFirst => Ok(self.network_first(request).await),
        }
    }

    /// Install: create the current partitions and prefetch the baseline
    /// assets into the static one.
    ///
    /// Any failed prefetch (transport failure or non-200) aborts the whole
    /// attempt; nothing is promoted and the engine returns to `New`.
    /// Success parks the engine in `Waiting` — ready to take over, but
    /// activation is the caller's (or a skip-waiting command's) decision.
    pub async fn install(&self) -> Result<(), Error> {
        self.lifecycle.begin_install().await?;
        tracing::info!(partition = %self.config.static_partition, "installing");

        match self.run_install().await {
            Ok(()) => {
                self.lifecycle.finish_install().await?;
                tracing::info!("install complete, waiting to activate");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                self.lifecycle.fail_install().await;
                Err(e)
            }
        }
    }

    async fn run_install(&self) -> Result<(), Error> {
        let static_partition = self.static_partition().await?;
        self.data_partition().await?;

        for asset in &self.config.precache {
            let request = RequestKey::get(asset);
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("prefetch {asset}: {e}")))?;

            if response.status != 200 {
                return Err(Error::InstallFailed(format!("prefetch {asset}: status {}", response.status)));
            }

            static_partition.put_entry(&request, &response).await?;
            tracing::debug!(asset = %asset, "prefetched");
        }

        Ok(())
    }

    /// Activate: garbage-collect stale partitions, then claim clients.
    ///
    /// Cleanup strictly precedes the claim — a claimed client must never
    /// be served from a partition that is about to disappear. Returns the
    /// number of newly claimed sessions.
    pub async fn activate(&self) -> Result<usize, Error> {
        self.lifecycle.begin_activate().await?;

        match self.run_activate().await {
            Ok(claimed) => {
                self.lifecycle.finish_activate().await?;
                tracing::info!(claimed, "activated");
                Ok(claimed)
            }
            Err(e) => {
                tracing::error!(error = %e, "activation failed");
                self.lifecycle.fail_activate().await;
                Err(e)
            }
        }
    }

    async fn run_activate(&self) -> Result<usize, Error> {
        let existing = self.store.list_partitions().await?;
        for name in self.registry.stale(existing.iter().map(String::as_str)) {
            if self.store.delete_partition(&name).await? {
                tracing::info!(partition = %name, "deleted stale partition");
            }
        }

        Ok(self.hub.claim_all().await)
    }

    /// Client-commanded takeover: activate now instead of waiting.
    pub async fn skip_waiting(&self) -> Result<usize, Error> {
        self.activate().await
    }

    /// Per-partition entry counts.
    pub async fn cache_status(&self) -> Result<Vec<PartitionStatus>, Error> {
        self.store.partition_status().await
    }

    /// Broadcast that a network-first fallback served from cache.
    pub(crate) async fn notify_cache_used(&self, url: &str) {
        let message = ClientMessage::CacheUsed { url: url.to_string(), timestamp: chrono::Utc::now().to_rfc3339() };
        let recipients = self.hub.broadcast(message).await;
        tracing::debug!(url = %url, recipients = recipients.len(), "cache-used notification sent");
    }

    /// Remember that a data sync is owed once connectivity returns.
    pub(crate) async fn register_pending_sync(&self) {
        self.pending_syncs.lock().await.insert(self.config.sync_tag.clone());
    }

    /// Signal clients to run their data-sync routines for every pending
    /// tag. The engine only signals; the sync itself is the client's.
    pub async fn connectivity_restored(&self) -> Vec<String> {
        let tags: Vec<String> = std::mem::take(&mut *self.pending_syncs.lock().await)
            .into_iter()
            .collect();
        for tag in &tags {
            self.hub
                .broadcast(ClientMessage::BackgroundSync { tag: tag.clone() })
                .await;
        }
        tags
    }
}
