//! HTTP network primitive.
//!
//! ### The `Network` seam
//! The strategy executors never talk to reqwest directly; they fetch
//! through the [`Network`] trait so tests can script reachable and
//! unreachable networks. Transport failure (offline, DNS, timeout) is an
//! `Err`; an HTTP error status is an `Ok` response carrying that status —
//! the executors treat the two very differently.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, resolve, same_origin};

use shelter_core::{Error, Method, RequestKey, ResponseSnapshot};

/// Configuration for the HTTP network client.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Origin that origin-relative request URLs resolve against.
    pub origin: String,

    /// User agent string (default: "shelter/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080/".to_string(),
            user_agent: "shelter/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// The network primitive consumed by the strategy executors.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, resolving to a response snapshot.
    ///
    /// # Errors
    ///
    /// `Error::Network` on transport failure; HTTP error statuses are not
    /// errors here.
    async fn fetch(&self, request: &RequestKey) -> Result<ResponseSnapshot, Error>;
}

/// Reqwest-backed [`Network`] implementation.
pub struct HttpNetwork {
    http: Client,
    origin: ::url::Url,
    config: NetworkConfig,
}

impl HttpNetwork {
    /// Create a new network client with the given configuration.
    pub fn new(config: NetworkConfig) -> Result<Self, Error> {
        let origin = ::url::Url::parse(&config.origin)
            .map_err(|e| Error::InvalidRequest(format!("invalid origin {}: {}", config.origin, e)))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, origin, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &RequestKey) -> Result<ResponseSnapshot, Error> {
        let start = Instant::now();
        let target = resolve(&self.origin, &request.url).map_err(|e| Error::InvalidRequest(e.to_string()))?;

        let response = self
            .http
            .request(reqwest_method(request.method), target.clone())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::Network(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::Network(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let content_type = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()))
            .map(|(_, value)| value.as_str())
            .unwrap_or("-");

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes, {})",
            request.url,
            status,
            start.elapsed().as_millis(),
            bytes.len(),
            content_type
        );

        Ok(ResponseSnapshot::new(status, headers, bytes.to_vec()))
    }
}
