//! Strategy router: classify a request into exactly one strategy.

use shelter_core::{AppConfig, Method, RequestKey};

/// How a request is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Prefer the static partition; consult the network only on a miss.
    CacheFirst,
    /// Prefer the live network; fall back to the data partition.
    NetworkFirst,
    /// Do not intercept; the request flows straight to the network.
    Bypass,
}

/// URL-substring predicates driving classification.
#[derive(Debug, Clone, Default)]
pub struct RoutingRules {
    pub excluded_origins: Vec<String>,
    pub data_endpoints: Vec<String>,
}

impl RoutingRules {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { excluded_origins: config.excluded_origins.clone(), data_endpoints: config.data_endpoints.clone() }
    }
}

/// Classify a request. Pure; deterministic for a given rule set.
///
/// Priority order:
/// 1. non-GET requests bypass (never cached)
/// 2. excluded origins bypass (third-party services handle their own
///    caching and auth; intercepting them breaks both)
/// 3. data endpoints go network-first
/// 4. everything else is cache-first
pub fn classify(rules: &RoutingRules, request: &RequestKey) -> Strategy {
    if request.method != Method::Get {
        return Strategy::Bypass;
    }

    if rules.excluded_origins.iter().any(|p| request.url.contains(p.as_str())) {
        return Strategy::Bypass;
    }

    if rules.data_endpoints.iter().any(|p| request.url.contains(p.as_str())) {
        return Strategy::NetworkFirst;
    }

    Strategy::CacheFirst
}
