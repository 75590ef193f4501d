//! Fakes for client tests: a native client with an empty conversation
//! store and an in-memory preference log.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_client::NativeClient;
use parley_consent::{EnvelopeLog, EnvelopePage, EnvelopeQuery, LogEnvelope};
use parley_conversations::{
    ConversationFilter, GroupOptions, ListConversationsOptions, Message, NativeConversation,
    NativeConversations, StreamCallback, StreamCloser,
};
use parley_types::{
    ConsentEntry, ConsentState, ConversationId, EntityKind, InboxId, ParleyError, ParleyResult,
};
use std::collections::HashMap;
use std::sync::Arc;

pub const INBOX: &str = "inbox-alix";
pub const SECRET: &[u8] = b"alix-installation-secret";

pub struct NoopCloser;

#[async_trait]
impl StreamCloser for NoopCloser {
    async fn end(&self) -> ParleyResult<()> {
        Ok(())
    }
}

/// Conversation store with nothing in it.
pub struct EmptyConversations;

#[async_trait]
impl NativeConversations for EmptyConversations {
    async fn create_group(
        &self,
        _inbox_ids: Vec<InboxId>,
        _options: GroupOptions,
    ) -> ParleyResult<Arc<dyn NativeConversation>> {
        Err(ParleyError::Transport("offline".into()))
    }

    async fn find_or_create_dm(&self, _inbox_id: InboxId) -> ParleyResult<Arc<dyn NativeConversation>> {
        Err(ParleyError::Transport("offline".into()))
    }

    async fn list(
        &self,
        _options: ListConversationsOptions,
    ) -> ParleyResult<Vec<Arc<dyn NativeConversation>>> {
        Ok(Vec::new())
    }

    fn find(&self, _id: &ConversationId) -> ParleyResult<Option<Arc<dyn NativeConversation>>> {
        Ok(None)
    }

    async fn sync(&self) -> ParleyResult<()> {
        Ok(())
    }

    async fn sync_all(&self, _consent_states: Option<Vec<ConsentState>>) -> ParleyResult<u32> {
        Ok(0)
    }

    async fn stream(
        &self,
        _filter: ConversationFilter,
        _callback: Arc<dyn StreamCallback<Arc<dyn NativeConversation>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        Ok(Box::new(NoopCloser))
    }

    async fn stream_all_messages(
        &self,
        _filter: ConversationFilter,
        _callback: Arc<dyn StreamCallback<Message>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        Ok(Box::new(NoopCloser))
    }

    async fn stream_consent(
        &self,
        _callback: Arc<dyn StreamCallback<Vec<ConsentEntry>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        Ok(Box::new(NoopCloser))
    }
}

/// Native client keeping consent in a map.
#[derive(Default)]
pub struct FakeNative {
    consent: Mutex<HashMap<String, ConsentState>>,
}

impl FakeNative {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl NativeClient for FakeNative {
    fn inbox_id(&self) -> InboxId {
        INBOX.to_string()
    }

    fn installation_id(&self) -> String {
        "installation-1".to_string()
    }

    fn conversations(&self) -> Arc<dyn NativeConversations> {
        Arc::new(EmptyConversations)
    }

    async fn set_consent_states(&self, entries: Vec<ConsentEntry>) -> ParleyResult<()> {
        let mut consent = self.consent.lock();
        for entry in entries {
            consent.insert(entry.key(), entry.state);
        }
        Ok(())
    }

    async fn get_consent_state(&self, kind: EntityKind, value: &str) -> ParleyResult<ConsentState> {
        Ok(self
            .consent
            .lock()
            .get(&ConsentEntry::key_for(kind, value))
            .copied()
            .unwrap_or_default())
    }
}

/// Append-only log without paging.
#[derive(Default)]
pub struct MemoryLog {
    envelopes: Mutex<Vec<LogEnvelope>>,
}

impl MemoryLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.envelopes.lock().len()
    }
}

#[async_trait]
impl EnvelopeLog for MemoryLog {
    async fn fetch_envelopes(&self, query: EnvelopeQuery) -> ParleyResult<EnvelopePage> {
        let envelopes = self
            .envelopes
            .lock()
            .iter()
            .filter(|e| e.topic == query.topic)
            .filter(|e| query.after_ns.is_none_or(|after| e.timestamp_ns > after))
            .cloned()
            .collect();
        Ok(EnvelopePage {
            envelopes,
            next_cursor: None,
        })
    }

    async fn publish(&self, envelope: LogEnvelope) -> ParleyResult<()> {
        self.envelopes.lock().push(envelope);
        Ok(())
    }
}
