//! Process-wide cache of gateway connections.
//!
//! Clients created with equivalent [`ApiOptions`] share one
//! [`HttpEnvelopeLog`]. A cached connection is reused only while it still
//! passes its health check.

use crate::config::ApiOptions;
use parking_lot::Mutex;
use parley_consent::HttpEnvelopeLog;
use parley_types::{ParleyError, ParleyResult};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

static GLOBAL: OnceLock<ApiClientCache> = OnceLock::new();

/// One cache key's connection. Locked across the health check so concurrent
/// callers for the same key connect once.
type Slot = Arc<tokio::sync::Mutex<Option<Arc<HttpEnvelopeLog>>>>;

#[derive(Default)]
pub struct ApiClientCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ApiClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every client in the process.
    pub fn global() -> &'static ApiClientCache {
        GLOBAL.get_or_init(ApiClientCache::new)
    }

    fn slot(&self, key: &str) -> Slot {
        self.slots.lock().entry(key.to_string()).or_default().clone()
    }

    /// Returns the cached connection for `api` if it is still healthy,
    /// otherwise connects a new one and caches it.
    pub async fn get_or_connect(&self, api: &ApiOptions) -> ParleyResult<Arc<HttpEnvelopeLog>> {
        let key = api.cache_key();
        let slot = self.slot(&key);
        let mut cached = slot.lock().await;

        if let Some(client) = cached.as_ref() {
            if client.is_connected().await {
                debug!("reusing gateway connection {key}");
                return Ok(client.clone());
            }
            debug!("cached gateway connection {key} is unhealthy, reconnecting");
            *cached = None;
        }

        let client = Arc::new(HttpEnvelopeLog::new(api.http_log_config())?);
        if !client.is_connected().await {
            return Err(ParleyError::Transport(format!(
                "gateway {} is unreachable",
                client.base_url()
            )));
        }

        info!("connected to gateway {}", client.base_url());
        *cached = Some(client.clone());
        Ok(client)
    }

    /// Number of cached connections.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();
        let mut connected = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                connected += 1;
            }
        }
        connected
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every cached connection.
    pub async fn clear(&self) {
        self.slots.lock().clear();
    }
}
