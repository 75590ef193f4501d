//! Call surface of the native protocol engine.
//!
//! Group cryptography, transport and storage live behind these traits. The
//! facade types in this crate never talk to the network themselves.

use crate::content::EncodedContent;
use crate::message::{
    DisappearingMessageSettings, ListMessagesOptions, Member, Message, MessageId,
};
use crate::options::{GroupOptions, ListConversationsOptions};
use crate::stream::{StreamCallback, StreamCloser};
use async_trait::async_trait;
use parley_types::{ConsentEntry, ConsentState, ConversationId, InboxId, ParleyResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which variant a native conversation is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Group,
    Dm,
}

/// Which conversations a listing or stream covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationFilter {
    #[default]
    All,
    Groups,
    Dms,
}

impl ConversationFilter {
    pub fn includes(&self, kind: ConversationType) -> bool {
        match self {
            Self::All => true,
            Self::Groups => kind == ConversationType::Group,
            Self::Dms => kind == ConversationType::Dm,
        }
    }
}

/// One native conversation (group or DM).
#[async_trait]
pub trait NativeConversation: Send + Sync {
    fn id(&self) -> ConversationId;

    fn created_at_ns(&self) -> i64;

    fn conversation_type(&self) -> ConversationType;

    // ── Messaging ──

    /// Queues `content` and transmits it as soon as possible.
    async fn send(&self, content: EncodedContent) -> ParleyResult<MessageId>;

    /// Stages `content` locally without transmitting it.
    fn send_optimistic(&self, content: EncodedContent) -> ParleyResult<MessageId>;

    /// Transmits every staged message.
    async fn publish_messages(&self) -> ParleyResult<()>;

    /// Transmits one staged message.
    async fn publish_message(&self, id: &str) -> ParleyResult<()>;

    async fn sync(&self) -> ParleyResult<()>;

    async fn find_messages(&self, options: ListMessagesOptions) -> ParleyResult<Vec<Message>>;

    // ── Consent ──

    fn consent_state(&self) -> ParleyResult<ConsentState>;

    async fn update_consent_state(&self, state: ConsentState) -> ParleyResult<()>;

    // ── Disappearing messages ──

    fn disappearing_settings(&self) -> ParleyResult<Option<DisappearingMessageSettings>>;

    async fn update_disappearing_settings(
        &self,
        settings: DisappearingMessageSettings,
    ) -> ParleyResult<()>;

    async fn remove_disappearing_settings(&self) -> ParleyResult<()>;

    // ── Membership ──

    async fn members(&self) -> ParleyResult<Vec<Member>>;

    /// Member inbox ids from the engine's local group state. No network.
    fn member_inbox_ids(&self) -> ParleyResult<Vec<InboxId>>;

    /// The other participant of a DM. `None` for groups.
    fn dm_peer_inbox_id(&self) -> Option<InboxId>;

    fn group_name(&self) -> ParleyResult<String>;

    async fn update_group_name(&self, name: String) -> ParleyResult<()>;

    async fn add_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()>;

    async fn remove_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()>;

    // ── Streaming ──

    async fn stream(
        &self,
        callback: Arc<dyn StreamCallback<Message>>,
    ) -> ParleyResult<Box<dyn StreamCloser>>;
}

/// The native conversation collection of one client.
#[async_trait]
pub trait NativeConversations: Send + Sync {
    async fn create_group(
        &self,
        inbox_ids: Vec<InboxId>,
        options: GroupOptions,
    ) -> ParleyResult<Arc<dyn NativeConversation>>;

    async fn find_or_create_dm(&self, inbox_id: InboxId) -> ParleyResult<Arc<dyn NativeConversation>>;

    async fn list(
        &self,
        options: ListConversationsOptions,
    ) -> ParleyResult<Vec<Arc<dyn NativeConversation>>>;

    fn find(&self, id: &ConversationId) -> ParleyResult<Option<Arc<dyn NativeConversation>>>;

    async fn sync(&self) -> ParleyResult<()>;

    /// Syncs every conversation; returns how many were synced.
    async fn sync_all(&self, consent_states: Option<Vec<ConsentState>>) -> ParleyResult<u32>;

    async fn stream(
        &self,
        filter: ConversationFilter,
        callback: Arc<dyn StreamCallback<Arc<dyn NativeConversation>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>>;

    async fn stream_all_messages(
        &self,
        filter: ConversationFilter,
        callback: Arc<dyn StreamCallback<Message>>,
    ) -> ParleyResult<Box<dyn StreamCloser>>;

    async fn stream_consent(
        &self,
        callback: Arc<dyn StreamCallback<Vec<ConsentEntry>>>,
    ) -> ParleyResult<Box<dyn StreamCloser>>;
}
