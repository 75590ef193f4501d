//! Shared helpers for consent integration tests: an in-memory envelope log
//! with request accounting, and envelope builders.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_consent::{
    ConsentList, Cursor, EnvelopeLog, EnvelopePage, EnvelopeQuery, LogEnvelope,
    PreferenceLogEvent, PreferencesConfig,
};
use parley_crypto::{SecretBytes, aead_encrypt};
use parley_types::{ParleyError, ParleyResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const SECRET: &[u8] = b"installation-identity-secret";

pub fn secret() -> SecretBytes {
    SecretBytes::new(SECRET.to_vec())
}

/// Append-only log held in memory. Cursors are offsets into the
/// filtered topic view.
#[derive(Default)]
pub struct MemoryLog {
    envelopes: Mutex<Vec<LogEnvelope>>,
    queries: Mutex<Vec<EnvelopeQuery>>,
    published: Mutex<Vec<LogEnvelope>>,
    fetch_count: AtomicUsize,
    fail_fetches: AtomicBool,
}

impl MemoryLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, envelopes: impl IntoIterator<Item = LogEnvelope>) {
        self.envelopes.lock().extend(envelopes);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<EnvelopeQuery> {
        self.queries.lock().clone()
    }

    pub fn published(&self) -> Vec<LogEnvelope> {
        self.published.lock().clone()
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EnvelopeLog for MemoryLog {
    async fn fetch_envelopes(&self, query: EnvelopeQuery) -> ParleyResult<EnvelopePage> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ParleyError::Transport("connection refused".into()));
        }

        let matching: Vec<LogEnvelope> = self
            .envelopes
            .lock()
            .iter()
            .filter(|e| e.topic == query.topic)
            .filter(|e| query.after_ns.is_none_or(|after| e.timestamp_ns > after))
            .cloned()
            .collect();

        let offset = query
            .cursor
            .as_ref()
            .and_then(|c| c.0.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (offset + query.page_size as usize).min(matching.len());
        let page = matching[offset.min(end)..end].to_vec();
        let next_cursor = (end < matching.len()).then(|| Cursor(end.to_string()));

        Ok(EnvelopePage {
            envelopes: page,
            next_cursor,
        })
    }

    async fn publish(&self, envelope: LogEnvelope) -> ParleyResult<()> {
        self.published.lock().push(envelope.clone());
        self.envelopes.lock().push(envelope);
        Ok(())
    }
}

pub fn consent_list(log: &Arc<MemoryLog>) -> ConsentList {
    consent_list_with(log, PreferencesConfig::default())
}

pub fn consent_list_with(log: &Arc<MemoryLog>, config: PreferencesConfig) -> ConsentList {
    ConsentList::new(log.clone(), secret(), config).expect("valid consent list")
}

/// Encrypts `event` the way a publishing installation would.
pub fn sealed_event(
    secret: &[u8],
    topic: &str,
    timestamp_ns: i64,
    event: &PreferenceLogEvent,
) -> LogEnvelope {
    let payload = serde_json::to_vec(event).expect("serialize event");
    sealed_bytes(secret, topic, timestamp_ns, &payload)
}

pub fn sealed_bytes(secret: &[u8], topic: &str, timestamp_ns: i64, payload: &[u8]) -> LogEnvelope {
    let sealed = aead_encrypt(secret, payload, None).expect("encrypt payload");
    LogEnvelope {
        topic: topic.to_string(),
        timestamp_ns,
        message: sealed.to_bytes(),
    }
}

pub fn allow_addresses(values: &[&str]) -> PreferenceLogEvent {
    PreferenceLogEvent {
        allow_address: values.iter().map(|v| v.to_string()).collect(),
        ..Default::default()
    }
}
