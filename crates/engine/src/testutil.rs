//! Test support: a scriptable network primitive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shelter_core::{AppConfig, Error, RequestKey, ResponseSnapshot};
use shelter_client::Network;

/// In-memory network: scripted responses per URL, with an offline switch.
pub struct MockNetwork {
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(HashMap::new()), offline: AtomicBool::new(false), calls: Mutex::new(Vec::new()) })
    }

    /// A reachable network serving the baseline shell manifest.
    pub fn online_with_shell() -> Arc<Self> {
        let network = Self::new();
        network.respond("./", ResponseSnapshot::new(200, vec![], b"<html>shell</html>".to_vec()));
        network.respond("./index.html", ResponseSnapshot::new(200, vec![], b"<html>shell</html>".to_vec()));
        network
    }

    pub fn respond(&self, url: &str, response: ResponseSnapshot) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &RequestKey) -> Result<ResponseSnapshot, Error> {
        self.calls.lock().unwrap().push(request.url.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".to_string()));
        }

        self.responses
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("no route to {}", request.url)))
    }
}

/// Config used across the engine tests: shell manifest of two assets,
/// default predicates and partition names.
pub fn test_config() -> AppConfig {
    AppConfig { precache: vec!["./".into(), "./index.html".into()], ..Default::default() }
}
