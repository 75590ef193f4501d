//! The client entry point.

use crate::api_cache::ApiClientCache;
use crate::config::{ClientOptions, Environment};
use crate::logging::init_logging;
use crate::native::NativeClient;
use chrono::{DateTime, Utc};
use parley_consent::{ConsentList, EnvelopeLog};
use parley_conversations::Conversations;
use parley_crypto::{DerivedKey, SecretBytes, derive_epoch_key, hmac_sign};
use parley_types::{ConsentEntry, ConsentState, EntityKind, InboxId, ParleyResult};
use std::sync::Arc;
use tracing::info;

const PUSH_NAMESPACE: &str = "push-hmac";

/// A connected installation.
pub struct Client {
    inbox_id: InboxId,
    installation_id: String,
    options: ClientOptions,
    native: Arc<dyn NativeClient>,
    conversations: Conversations,
    preferences: ConsentList,
    key_material: SecretBytes,
}

impl Client {
    /// Connects to the gateway for `options.api` (through the process-wide
    /// cache) and wires up conversations and preferences.
    ///
    /// `key_material` is the static secret that encrypts the preference log.
    pub async fn create(
        options: ClientOptions,
        native: Arc<dyn NativeClient>,
        key_material: SecretBytes,
    ) -> ParleyResult<Self> {
        options.validate()?;
        if let Some(level) = options.log_level {
            init_logging(level);
        }

        let api = ApiClientCache::global().get_or_connect(&options.api).await?;
        Self::with_log(options, native, key_material, api)
    }

    /// Builds a client over an already connected preference log.
    pub fn with_log(
        options: ClientOptions,
        native: Arc<dyn NativeClient>,
        key_material: SecretBytes,
        log: Arc<dyn EnvelopeLog>,
    ) -> ParleyResult<Self> {
        options.validate()?;

        let inbox_id = native.inbox_id();
        let installation_id = native.installation_id();
        let preferences = ConsentList::new(log, key_material.clone(), options.preferences.clone())?;
        let conversations = Conversations::new(native.conversations(), inbox_id.clone());

        info!(
            "client ready: inbox {inbox_id}, installation {installation_id}, env {}",
            options.api.env
        );
        Ok(Self {
            inbox_id,
            installation_id,
            options,
            native,
            conversations,
            preferences,
            key_material,
        })
    }

    pub fn inbox_id(&self) -> &str {
        &self.inbox_id
    }

    pub fn installation_id(&self) -> &str {
        &self.installation_id
    }

    pub fn environment(&self) -> Environment {
        self.options.api.env
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    /// The encrypted consent preference log for this identity.
    pub fn preferences(&self) -> &ConsentList {
        &self.preferences
    }

    /// Replays the preference log; see [`ConsentList::load`].
    pub async fn sync_preferences(&self) -> ParleyResult<Vec<ConsentEntry>> {
        self.preferences.load().await
    }

    /// Records consent decisions in the native engine.
    pub async fn set_consent_states(&self, entries: Vec<ConsentEntry>) -> ParleyResult<()> {
        self.native.set_consent_states(entries).await
    }

    /// Consent as known to the native engine.
    pub async fn consent_state(&self, kind: EntityKind, value: &str) -> ParleyResult<ConsentState> {
        self.native.get_consent_state(kind, value).await
    }

    // ── Push ──

    /// HMAC key for push tokens in the 30-day epoch containing `at`.
    pub fn push_hmac_key(&self, at: DateTime<Utc>) -> ParleyResult<DerivedKey> {
        Ok(derive_epoch_key(self.key_material.expose(), at, PUSH_NAMESPACE)?)
    }

    /// Hex token a push server can match incoming envelopes against without
    /// learning the conversation topic.
    pub fn push_token(&self, topic: &str, at: DateTime<Utc>) -> ParleyResult<String> {
        let key = self.push_hmac_key(at)?;
        Ok(hex::encode(hmac_sign(key.as_bytes(), topic.as_bytes())?))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("inbox_id", &self.inbox_id)
            .field("installation_id", &self.installation_id)
            .field("env", &self.options.api.env)
            .finish()
    }
}
