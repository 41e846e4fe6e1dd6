//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELTER_*)
//! 2. TOML config file (if SHELTER_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The partition names and routing predicates live here rather than in
//! module constants so that several independently configured engines can
//! coexist in one process (the test suites rely on this).

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELTER_*)
/// 2. TOML config file (if SHELTER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin that origin-relative URLs (`./index.html`) resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current static-asset partition. Embeds the deployment
    /// version; bumping it makes the previous partition stale.
    #[serde(default = "default_static_partition")]
    pub static_partition: String,

    /// Name of the current dynamic-data partition.
    #[serde(default = "default_data_partition")]
    pub data_partition: String,

    /// Baseline assets prefetched into the static partition at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Document served from cache when a navigation request cannot reach
    /// the network (the application shell).
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,

    /// URL substrings that are never intercepted.
    #[serde(default = "default_excluded_origins")]
    pub excluded_origins: Vec<String>,

    /// URL substrings routed network-first into the data partition.
    #[serde(default = "default_data_endpoints")]
    pub data_endpoints: Vec<String>,

    /// URL opened or focused when a notification's "open" action fires.
    #[serde(default = "default_app_scope")]
    pub app_scope: String,

    /// Tag broadcast with background-sync triggers.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// User-Agent string for network fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shelter-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_static_partition() -> String {
    "shelter-static-v1.0.0".into()
}

fn default_data_partition() -> String {
    "shelter-data-v1.0.0".into()
}

fn default_precache() -> Vec<String> {
    vec!["./".into(), "./index.html".into(), "./manifest.json".into()]
}

fn default_fallback_document() -> String {
    "./index.html".into()
}

fn default_excluded_origins() -> Vec<String> {
    vec![
        "supabase.co".into(),
        "supabase.com".into(),
        "googleapis.com".into(),
        "gstatic.com".into(),
    ]
}

fn default_data_endpoints() -> Vec<String> {
    vec!["/rest/v1/".into(), "/api/".into()]
}

fn default_app_scope() -> String {
    "./".into()
}

fn default_sync_tag() -> String {
    "shelter-data-sync".into()
}

fn default_user_agent() -> String {
    "shelter/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            static_partition: default_static_partition(),
            data_partition: default_data_partition(),
            precache: default_precache(),
            fallback_document: default_fallback_document(),
            excluded_origins: default_excluded_origins(),
            data_endpoints: default_data_endpoints(),
            app_scope: default_app_scope(),
            sync_tag: default_sync_tag(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELTER_`
    /// 2. TOML file from `SHELTER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELTER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELTER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
