//! Normalized request descriptors and cache-key generation.
//!
//! A [`RequestKey`] is the unit the router classifies and the store is
//! keyed by: method + normalized URL, plus the request mode (document
//! navigation vs. subresource) that the cache-first fallback needs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// HTTP request method. Only GET requests are eligible for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

/// What the request is for, as reported by the requesting client.
///
/// Navigation requests get the application-shell fallback when the
/// network is unreachable; plain resources get a synthetic 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    Navigation,
    Resource,
}

/// A normalized request descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
    pub mode: RequestMode,
}

impl RequestKey {
    /// A GET request for a subresource.
    pub fn get(url: &str) -> Self {
        Self { method: Method::Get, url: normalize_url(url), mode: RequestMode::Resource }
    }

    /// A GET request for a document navigation.
    pub fn navigation(url: &str) -> Self {
        Self { method: Method::Get, url: normalize_url(url), mode: RequestMode::Navigation }
    }

    /// A request with an explicit method, treated as a subresource.
    pub fn with_method(method: Method, url: &str) -> Self {
        Self { method, url: normalize_url(url), mode: RequestMode::Resource }
    }

    /// Compute the cache key for this request.
    ///
    /// SHA-256 over method and normalized URL, hex-encoded. Stable across
    /// processes, so entries written by one deployment are found by the
    /// next as long as the partition survives.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Normalize a URL for keying: trim whitespace and strip the fragment.
///
/// Query strings are kept intact; fragments never reach the server so two
/// URLs differing only by fragment are the same resource.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.find('#') {
        Some(idx) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}
