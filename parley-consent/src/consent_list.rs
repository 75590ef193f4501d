//! The consent synchronizer.
//!
//! `ConsentList` owns the in-memory view of one identity's preference log.
//! Local mutations (`allow`, `deny`) only touch the map; nothing reaches the
//! network until `publish` (or a bulk operation) appends an event.

use crate::config::PreferencesConfig;
use crate::entries::EntriesMap;
use crate::log::EnvelopeLog;
use crate::types::{Cursor, EnvelopeQuery, LogEnvelope, PreferenceLogEvent, SortDirection};
use futures::future::join_all;
use parking_lot::Mutex;
use parley_crypto::{AeadCiphertext, SecretBytes, aead_decrypt, aead_encrypt, hmac_sign};
use parley_types::{ConsentEntry, ConsentState, EntityKind, ParleyError, ParleyResult, now_ns};
use std::sync::Arc;
use tracing::{debug, info};

const TOPIC_LABEL: &[u8] = b"private-preferences";

/// Consent preferences for a single identity.
pub struct ConsentList {
    entries: EntriesMap,
    log: Arc<dyn EnvelopeLog>,
    secret: SecretBytes,
    topic: String,
    config: PreferencesConfig,
    /// Start time of the last successful load, in nanoseconds.
    last_fetched: Mutex<Option<i64>>,
}

impl ConsentList {
    /// Creates an empty list bound to the log topic derived from `secret`.
    pub fn new(
        log: Arc<dyn EnvelopeLog>,
        secret: SecretBytes,
        config: PreferencesConfig,
    ) -> ParleyResult<Self> {
        if secret.is_empty() {
            return Err(ParleyError::Config("preference secret must not be empty".into()));
        }
        if config.page_size == 0 {
            return Err(ParleyError::Config("page_size must be at least 1".into()));
        }

        let topic = preference_topic(&secret)?;
        Ok(Self {
            entries: EntriesMap::new(),
            log,
            secret,
            topic,
            config,
            last_fetched: Mutex::new(None),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn last_fetched(&self) -> Option<i64> {
        *self.last_fetched.lock()
    }

    pub fn config(&self) -> &PreferencesConfig {
        &self.config
    }

    // ── Sync ──

    /// Fetches every envelope newer than the last load, replays it, and
    /// returns a snapshot of all entries.
    ///
    /// Fails as a whole: if any envelope cannot be decrypted or parsed,
    /// nothing is applied and `last_fetched` stays where it was.
    pub async fn load(&self) -> ParleyResult<Vec<ConsentEntry>> {
        let started_at = now_ns();
        let envelopes = self.fetch_all().await?;

        let events = envelopes
            .iter()
            .map(|envelope| self.open(envelope))
            .collect::<ParleyResult<Vec<_>>>()?;

        let actions: Vec<ConsentEntry> = events.iter().flat_map(|e| e.actions()).collect();
        let action_count = actions.len();
        self.entries.apply(actions);
        *self.last_fetched.lock() = Some(started_at);

        debug!(
            "replayed {} preference events ({action_count} actions) from {}",
            events.len(),
            self.topic
        );
        Ok(self.entries.snapshot())
    }

    async fn fetch_all(&self) -> ParleyResult<Vec<LogEnvelope>> {
        let limit = self.config.result_limit;
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let page_size = self.config.page_size;
        let after_ns = self.last_fetched();
        let mut cursor: Option<Cursor> = None;
        let mut envelopes = Vec::new();

        loop {
            let page = self
                .log
                .fetch_envelopes(EnvelopeQuery {
                    topic: self.topic.clone(),
                    after_ns,
                    cursor: cursor.take(),
                    page_size,
                    direction: SortDirection::Ascending,
                })
                .await?;

            let received = page.envelopes.len();
            envelopes.extend(page.envelopes);

            if let Some(limit) = limit {
                if envelopes.len() >= limit {
                    envelopes.truncate(limit);
                    break;
                }
            }
            if received < page_size as usize {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(envelopes)
    }

    fn open(&self, envelope: &LogEnvelope) -> ParleyResult<PreferenceLogEvent> {
        let sealed = AeadCiphertext::from_bytes(&envelope.message)?;
        let plaintext = aead_decrypt(self.secret.expose(), &sealed, None)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    // ── Local mutations ──

    /// Marks `(kind, value)` allowed locally. Does not publish.
    pub fn allow(&self, kind: EntityKind, value: &str) -> ConsentEntry {
        self.entries.upsert(kind, value, ConsentState::Allowed)
    }

    /// Marks `(kind, value)` denied locally. Does not publish.
    pub fn deny(&self, kind: EntityKind, value: &str) -> ConsentEntry {
        self.entries.upsert(kind, value, ConsentState::Denied)
    }

    /// Allows every value, then publishes them as a single event.
    pub async fn bulk_allow<I, S>(&self, kind: EntityKind, values: I) -> ParleyResult<Vec<ConsentEntry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bulk_update(kind, values, ConsentState::Allowed).await
    }

    /// Denies every value, then publishes them as a single event.
    pub async fn bulk_deny<I, S>(&self, kind: EntityKind, values: I) -> ParleyResult<Vec<ConsentEntry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bulk_update(kind, values, ConsentState::Denied).await
    }

    async fn bulk_update<I, S>(
        &self,
        kind: EntityKind,
        values: I,
        state: ConsentState,
    ) -> ParleyResult<Vec<ConsentEntry>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let updates = values.into_iter().map(|value| {
            let entries = self.entries.clone();
            let value: String = value.into();
            async move { entries.upsert(kind, &value, state) }
        });
        let updated = join_all(updates).await;

        if updated.is_empty() {
            return Ok(updated);
        }
        self.publish(&updated).await?;
        Ok(updated)
    }

    // ── Publish ──

    /// Appends one encrypted event carrying `entries` to the log.
    ///
    /// `Unknown` entries have no representation on the log and are skipped;
    /// if nothing remains, no envelope is written.
    pub async fn publish(&self, entries: &[ConsentEntry]) -> ParleyResult<()> {
        let event = PreferenceLogEvent::from_entries(entries);
        if event.is_empty() {
            debug!("nothing to publish to {}", self.topic);
            return Ok(());
        }

        let payload = serde_json::to_vec(&event)?;
        let sealed = aead_encrypt(self.secret.expose(), &payload, None)?;
        let envelope = LogEnvelope {
            topic: self.topic.clone(),
            timestamp_ns: now_ns(),
            message: sealed.to_bytes(),
        };

        self.log.publish(envelope).await?;
        info!("published {} consent actions to {}", event.len(), self.topic);
        Ok(())
    }

    // ── Reads ──

    /// Current local state. Never touches the network.
    pub fn state(&self, kind: EntityKind, value: &str) -> ConsentState {
        self.entries.state(kind, value)
    }

    pub fn is_allowed(&self, kind: EntityKind, value: &str) -> bool {
        self.state(kind, value) == ConsentState::Allowed
    }

    pub fn is_denied(&self, kind: EntityKind, value: &str) -> bool {
        self.state(kind, value) == ConsentState::Denied
    }

    /// Snapshot of every known entry.
    pub fn entries(&self) -> Vec<ConsentEntry> {
        self.entries.snapshot()
    }
}

/// Log topic for a secret: hex HMAC over a fixed label.
fn preference_topic(secret: &SecretBytes) -> ParleyResult<String> {
    let tag = hmac_sign(secret.expose(), TOPIC_LABEL)?;
    Ok(format!("preferences-{}", hex::encode(tag)))
}

impl std::fmt::Debug for ConsentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentList")
            .field("topic", &self.topic)
            .field("entries", &self.entries)
            .field("last_fetched", &self.last_fetched())
            .finish()
    }
}
