//! In-memory native engine for conversation tests.
//!
//! Mirrors the delivery model of the real engine: `send` queues and
//! transmits immediately, `send_optimistic` only stages, and `sync` is what
//! promotes transmitted messages to `Published`.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_conversations::{
    ConversationFilter, ConversationType, Conversations, DeliveryStatus,
    DisappearingMessageSettings, EncodedContent, GroupOptions, ListConversationsOptions,
    ListMessagesOptions, Member, Message, MessageId, NativeConversation, NativeConversations,
    PermissionLevel, StreamCallback, StreamCloser,
};
use parley_types::{
    ConsentEntry, ConsentState, ConversationId, InboxId, ParleyError, ParleyResult, SortDirection,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

pub const ME: &str = "inbox-me";

type Subscribers<T> = Arc<Mutex<Vec<Arc<dyn StreamCallback<T>>>>>;

// ── Closer ──

/// Closer that counts `end()` calls and can be told to fail.
#[derive(Clone, Default)]
pub struct CountingCloser {
    pub closes: Arc<AtomicUsize>,
    pub fail: bool,
}

impl CountingCloser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn boxed(&self) -> Box<dyn StreamCloser> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl StreamCloser for CountingCloser {
    async fn end(&self) -> ParleyResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ParleyError::Transport("close failed".into()));
        }
        Ok(())
    }
}

/// Polls `condition` until it holds or a second passes.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

// ── Conversation ──

struct StoredMessage {
    message: Message,
    transmitted: bool,
}

struct ConversationState {
    name: String,
    members: Vec<InboxId>,
    messages: Vec<StoredMessage>,
    consent: ConsentState,
    disappearing: Option<DisappearingMessageSettings>,
    clock: i64,
}

pub struct FakeConversation {
    id: ConversationId,
    kind: ConversationType,
    created_at_ns: i64,
    peer: Option<InboxId>,
    state: Mutex<ConversationState>,
    subscribers: Subscribers<Message>,
    all_subscribers: Subscribers<Message>,
    pub io_calls: AtomicUsize,
    pub closer: CountingCloser,
}

impl FakeConversation {
    fn new(
        id: ConversationId,
        kind: ConversationType,
        created_at_ns: i64,
        members: Vec<InboxId>,
        all_subscribers: Subscribers<Message>,
    ) -> Self {
        let peer = match kind {
            ConversationType::Dm => members.iter().find(|m| *m != ME).cloned(),
            ConversationType::Group => None,
        };
        Self {
            id,
            kind,
            created_at_ns,
            peer,
            state: Mutex::new(ConversationState {
                name: String::new(),
                members,
                messages: Vec::new(),
                consent: ConsentState::Allowed,
                disappearing: None,
                clock: created_at_ns,
            }),
            subscribers: Arc::default(),
            all_subscribers,
            io_calls: AtomicUsize::new(0),
            closer: CountingCloser::new(),
        }
    }

    /// Standalone conversation with its own subscriber lists.
    pub fn standalone(id: &[u8], kind: ConversationType, members: &[&str]) -> Arc<Self> {
        Arc::new(Self::new(
            ConversationId::new(id.to_vec()),
            kind,
            1_000,
            members.iter().map(|m| m.to_string()).collect(),
            Arc::default(),
        ))
    }

    pub fn io_calls(&self) -> usize {
        self.io_calls.load(Ordering::SeqCst)
    }

    fn io(&self) {
        self.io_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn stage(&self, content: EncodedContent, transmitted: bool) -> Message {
        let mut state = self.state.lock();
        state.clock += 1;
        let message = Message {
            id: format!("{}{:04x}", self.id.to_hex(), state.messages.len()),
            conversation_id: self.id.clone(),
            sender_inbox_id: ME.to_string(),
            sent_at_ns: state.clock,
            content,
            delivery_status: DeliveryStatus::Unpublished,
        };
        state.messages.push(StoredMessage {
            message: message.clone(),
            transmitted,
        });
        message
    }

    /// Delivers an incoming message to every subscriber.
    pub fn receive(&self, message: Message) {
        let subscribers: Vec<_> = self
            .subscribers
            .lock()
            .iter()
            .chain(self.all_subscribers.lock().iter())
            .cloned()
            .collect();
        for subscriber in subscribers {
            subscriber.on_item(message.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[async_trait]
impl NativeConversation for FakeConversation {
    fn id(&self) -> ConversationId {
        self.id.clone()
    }

    fn created_at_ns(&self) -> i64 {
        self.created_at_ns
    }

    fn conversation_type(&self) -> ConversationType {
        self.kind
    }

    async fn send(&self, content: EncodedContent) -> ParleyResult<MessageId> {
        self.io();
        let message = self.stage(content, true);
        self.receive(message.clone());
        Ok(message.id)
    }

    fn send_optimistic(&self, content: EncodedContent) -> ParleyResult<MessageId> {
        Ok(self.stage(content, false).id)
    }

    async fn publish_messages(&self) -> ParleyResult<()> {
        self.io();
        for stored in self.state.lock().messages.iter_mut() {
            stored.transmitted = true;
        }
        Ok(())
    }

    async fn publish_message(&self, id: &str) -> ParleyResult<()> {
        self.io();
        let mut state = self.state.lock();
        let stored = state
            .messages
            .iter_mut()
            .find(|m| m.message.id == id)
            .ok_or_else(|| ParleyError::Transport(format!("message {id} not found")))?;
        stored.transmitted = true;
        Ok(())
    }

    async fn sync(&self) -> ParleyResult<()> {
        self.io();
        for stored in self.state.lock().messages.iter_mut() {
            if stored.transmitted {
                stored.message.delivery_status = DeliveryStatus::Published;
            }
        }
        Ok(())
    }

    async fn find_messages(&self, options: ListMessagesOptions) -> ParleyResult<Vec<Message>> {
        self.io();
        let mut messages: Vec<Message> = self
            .state
            .lock()
            .messages
            .iter()
            .map(|m| m.message.clone())
            .filter(|m| options.matches(m))
            .collect();
        if options.direction == SortDirection::Descending {
            messages.reverse();
        }
        if let Some(limit) = options.limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    fn consent_state(&self) -> ParleyResult<ConsentState> {
        Ok(self.state.lock().consent)
    }

    async fn update_consent_state(&self, state: ConsentState) -> ParleyResult<()> {
        self.io();
        self.state.lock().consent = state;
        Ok(())
    }

    fn disappearing_settings(&self) -> ParleyResult<Option<DisappearingMessageSettings>> {
        Ok(self.state.lock().disappearing)
    }

    async fn update_disappearing_settings(
        &self,
        settings: DisappearingMessageSettings,
    ) -> ParleyResult<()> {
        self.io();
        self.state.lock().disappearing = Some(settings);
        Ok(())
    }

    async fn remove_disappearing_settings(&self) -> ParleyResult<()> {
        self.io();
        self.state.lock().disappearing = None;
        Ok(())
    }

    async fn members(&self) -> ParleyResult<Vec<Member>> {
        self.io();
        Ok(self
            .state
            .lock()
            .members
            .iter()
            .map(|inbox_id| Member {
                inbox_id: inbox_id.clone(),
                permission_level: if inbox_id == ME {
                    PermissionLevel::SuperAdmin
                } else {
                    PermissionLevel::Member
                },
                consent_state: ConsentState::Allowed,
            })
            .collect())
    }

    fn member_inbox_ids(&self) -> ParleyResult<Vec<InboxId>> {
        Ok(self.state.lock().members.clone())
    }

    fn dm_peer_inbox_id(&self) -> Option<InboxId> {
        self.peer.clone()
    }

    fn group_name(&self) -> ParleyResult<String> {
        Ok(self.state.lock().name.clone())
    }

    async fn update_group_name(&self, name: String) -> ParleyResult<()> {
        self.io();
        self.state.lock().name = name;
        Ok(())
    }

    async fn add_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.io();
        let mut state = self.state.lock();
        for id in inbox_ids {
            if !state.members.contains(&id) {
                state.members.push(id);
            }
        }
        Ok(())
    }

    async fn remove_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.io();
        self.state.lock().members.retain(|m| !inbox_ids.contains(m));
        Ok(())
    }

    async fn stream(
        &self,
        callback: Arc<dyn StreamCallback<Message>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        self.io();
        self.subscribers.lock().push(callback);
        Ok(self.closer.boxed())
    }
}

// ── Engine ──

#[derive(Default)]
pub struct FakeEngine {
    conversations: Mutex<Vec<Arc<FakeConversation>>>,
    next_id: AtomicU64,
    conversation_subscribers: Subscribers<Arc<dyn NativeConversation>>,
    message_subscribers: Subscribers<Message>,
    consent_subscribers: Subscribers<Vec<ConsentEntry>>,
    pub closer: CountingCloser,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn conversations(self: &Arc<Self>) -> Conversations {
        Conversations::new(self.clone(), ME.to_string())
    }

    fn create(&self, kind: ConversationType, members: Vec<InboxId>) -> Arc<FakeConversation> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let conversation = Arc::new(FakeConversation::new(
            ConversationId::new(n.to_be_bytes().to_vec()),
            kind,
            (n as i64) * 1_000,
            members,
            self.message_subscribers.clone(),
        ));
        self.conversations.lock().push(conversation.clone());

        let subscribers = self.conversation_subscribers.lock().clone();
        for subscriber in subscribers {
            subscriber.on_item(conversation.clone());
        }
        conversation
    }

    pub fn get(&self, id: &ConversationId) -> Option<Arc<FakeConversation>> {
        self.conversations.lock().iter().find(|c| c.id == *id).cloned()
    }

    pub fn emit_consent(&self, entries: Vec<ConsentEntry>) {
        let subscribers = self.consent_subscribers.lock().clone();
        for subscriber in subscribers {
            subscriber.on_item(entries.clone());
        }
    }
}

#[async_trait]
impl NativeConversations for FakeEngine {
    async fn create_group(
        &self,
        inbox_ids: Vec<InboxId>,
        options: GroupOptions,
    ) -> ParleyResult<Arc<dyn NativeConversation>> {
        let mut members = vec![ME.to_string()];
        members.extend(inbox_ids);
        let group = self.create(ConversationType::Group, members);
        {
            let mut state = group.state.lock();
            state.name = options.name.unwrap_or_default();
            state.disappearing = options.disappearing;
        }
        Ok(group as Arc<dyn NativeConversation>)
    }

    async fn find_or_create_dm(&self, inbox_id: InboxId) -> ParleyResult<Arc<dyn NativeConversation>> {
        let existing = self
            .conversations
            .lock()
            .iter()
            .find(|c| c.peer.as_deref() == Some(inbox_id.as_str()))
            .cloned();
        match existing {
            Some(dm) => Ok(dm as Arc<dyn NativeConversation>),
            None => Ok(self.create(ConversationType::Dm, vec![ME.to_string(), inbox_id])
                as Arc<dyn NativeConversation>),
        }
    }

    async fn list(
        &self,
        options: ListConversationsOptions,
    ) -> ParleyResult<Vec<Arc<dyn NativeConversation>>> {
        let mut out: Vec<Arc<dyn NativeConversation>> = Vec::new();
        for conversation in self.conversations.lock().iter() {
            let consent = conversation.state.lock().consent;
            let matches = options.filter.includes(conversation.kind)
                && options
                    .consent_states
                    .as_ref()
                    .is_none_or(|states| states.contains(&consent))
                && options
                    .created_after_ns
                    .is_none_or(|t| conversation.created_at_ns > t)
                && options
                    .created_before_ns
                    .is_none_or(|t| conversation.created_at_ns < t);
            if matches {
                out.push(conversation.clone());
            }
        }
        if let Some(limit) = options.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    fn find(&self, id: &ConversationId) -> ParleyResult<Option<Arc<dyn NativeConversation>>> {
        Ok(self
            .get(id)
            .map(|c| c as Arc<dyn NativeConversation>))
    }

    async fn sync(&self) -> ParleyResult<()> {
        Ok(())
    }

    async fn sync_all(&self, consent_states: Option<Vec<ConsentState>>) -> ParleyResult<u32> {
        let conversations = self.conversations.lock().clone();
        let mut synced = 0;
        for conversation in conversations {
            let consent = conversation.state.lock().consent;
            if consent_states.as_ref().is_none_or(|s| s.contains(&consent)) {
                conversation.sync().await?;
                synced += 1;
            }
        }
        Ok(synced)
    }

    async fn stream(
        &self,
        _filter: ConversationFilter,
        callback: Arc<dyn StreamCallback<Arc<dyn NativeConversation>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        self.conversation_subscribers.lock().push(callback);
        Ok(self.closer.boxed())
    }

    async fn stream_all_messages(
        &self,
        _filter: ConversationFilter,
        callback: Arc<dyn StreamCallback<Message>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        self.message_subscribers.lock().push(callback);
        Ok(self.closer.boxed())
    }

    async fn stream_consent(
        &self,
        callback: Arc<dyn StreamCallback<Vec<ConsentEntry>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>> {
        self.consent_subscribers.lock().push(callback);
        Ok(self.closer.boxed())
    }
}
