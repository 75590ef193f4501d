//! The closed sum over conversation variants.

use crate::content::{ContentCodec, EncodedContent};
use crate::dm::Dm;
use crate::group::Group;
use crate::message::{DisappearingMessageSettings, ListMessagesOptions, Member, Message, MessageId};
use crate::native::{ConversationType, NativeConversation};
use crate::stream::ItemStream;
use parley_types::{ConsentState, ConversationId, InboxId, ParleyError, ParleyResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A group or a DM.
///
/// Two conversations are equal when their native ids are equal, whatever
/// the variant.
#[derive(Clone, Debug)]
pub enum Conversation {
    Group(Group),
    Dm(Dm),
}

impl Conversation {
    /// Wraps a native conversation in the matching variant.
    pub fn from_native(native: Arc<dyn NativeConversation>, self_inbox_id: &str) -> Self {
        match native.conversation_type() {
            ConversationType::Group => Self::Group(Group::new(native, self_inbox_id.to_string())),
            ConversationType::Dm => Self::Dm(Dm::new(native)),
        }
    }

    pub fn conversation_type(&self) -> ConversationType {
        match self {
            Self::Group(_) => ConversationType::Group,
            Self::Dm(_) => ConversationType::Dm,
        }
    }

    pub fn id(&self) -> ConversationId {
        match self {
            Self::Group(group) => group.id(),
            Self::Dm(dm) => dm.id(),
        }
    }

    pub fn topic(&self) -> String {
        match self {
            Self::Group(group) => group.topic(),
            Self::Dm(dm) => dm.topic(),
        }
    }

    pub fn created_at_ns(&self) -> i64 {
        match self {
            Self::Group(group) => group.created_at_ns(),
            Self::Dm(dm) => dm.created_at_ns(),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Dm(_) => None,
        }
    }

    pub fn as_dm(&self) -> Option<&Dm> {
        match self {
            Self::Group(_) => None,
            Self::Dm(dm) => Some(dm),
        }
    }

    fn group_only(&self, operation: &str) -> ParleyResult<&Group> {
        self.as_group().ok_or_else(|| {
            ParleyError::capability(format!("{operation} is not supported on a dm"))
        })
    }

    // ── Sending ──

    pub async fn send<C: ContentCodec>(&self, codec: &C, content: &C::Content) -> ParleyResult<MessageId> {
        match self {
            Self::Group(group) => group.send(codec, content).await,
            Self::Dm(dm) => dm.send(codec, content).await,
        }
    }

    pub async fn send_text(&self, text: &str) -> ParleyResult<MessageId> {
        match self {
            Self::Group(group) => group.send_text(text).await,
            Self::Dm(dm) => dm.send_text(text).await,
        }
    }

    pub async fn send_encoded(&self, content: EncodedContent) -> ParleyResult<MessageId> {
        match self {
            Self::Group(group) => group.send_encoded(content).await,
            Self::Dm(dm) => dm.send_encoded(content).await,
        }
    }

    pub fn prepare_message<C: ContentCodec>(&self, codec: &C, content: &C::Content) -> ParleyResult<MessageId> {
        match self {
            Self::Group(group) => group.prepare_message(codec, content),
            Self::Dm(dm) => dm.prepare_message(codec, content),
        }
    }

    pub fn prepare_text(&self, text: &str) -> ParleyResult<MessageId> {
        match self {
            Self::Group(group) => group.prepare_text(text),
            Self::Dm(dm) => dm.prepare_text(text),
        }
    }

    pub async fn publish_messages(&self) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.publish_messages().await,
            Self::Dm(dm) => dm.publish_messages().await,
        }
    }

    pub async fn publish_message(&self, id: &str) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.publish_message(id).await,
            Self::Dm(dm) => dm.publish_message(id).await,
        }
    }

    // ── Reading ──

    pub async fn messages(&self, options: ListMessagesOptions) -> ParleyResult<Vec<Message>> {
        match self {
            Self::Group(group) => group.messages(options).await,
            Self::Dm(dm) => dm.messages(options).await,
        }
    }

    pub async fn last_message(&self) -> ParleyResult<Option<Message>> {
        match self {
            Self::Group(group) => group.last_message().await,
            Self::Dm(dm) => dm.last_message().await,
        }
    }

    pub async fn sync(&self) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.sync().await,
            Self::Dm(dm) => dm.sync().await,
        }
    }

    // ── Consent ──

    pub fn consent_state(&self) -> ParleyResult<ConsentState> {
        match self {
            Self::Group(group) => group.consent_state(),
            Self::Dm(dm) => dm.consent_state(),
        }
    }

    pub async fn update_consent_state(&self, state: ConsentState) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.update_consent_state(state).await,
            Self::Dm(dm) => dm.update_consent_state(state).await,
        }
    }

    // ── Disappearing messages ──

    pub fn disappearing_message_settings(&self) -> ParleyResult<Option<DisappearingMessageSettings>> {
        match self {
            Self::Group(group) => group.disappearing_message_settings(),
            Self::Dm(dm) => dm.disappearing_message_settings(),
        }
    }

    pub fn is_disappearing_messages_enabled(&self) -> ParleyResult<bool> {
        match self {
            Self::Group(group) => group.is_disappearing_messages_enabled(),
            Self::Dm(dm) => dm.is_disappearing_messages_enabled(),
        }
    }

    pub async fn update_disappearing_message_settings(
        &self,
        settings: DisappearingMessageSettings,
    ) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.update_disappearing_message_settings(settings).await,
            Self::Dm(dm) => dm.update_disappearing_message_settings(settings).await,
        }
    }

    pub async fn clear_disappearing_message_settings(&self) -> ParleyResult<()> {
        match self {
            Self::Group(group) => group.clear_disappearing_message_settings().await,
            Self::Dm(dm) => dm.clear_disappearing_message_settings().await,
        }
    }

    // ── Membership ──

    pub async fn members(&self) -> ParleyResult<Vec<Member>> {
        match self {
            Self::Group(group) => group.members().await,
            Self::Dm(dm) => dm.members().await,
        }
    }

    /// Every participant except the local inbox. Reads local state only.
    pub fn peer_inbox_ids(&self) -> ParleyResult<Vec<InboxId>> {
        match self {
            Self::Group(group) => group.peer_inbox_ids(),
            Self::Dm(dm) => Ok(vec![dm.peer_inbox_id()?]),
        }
    }

    /// The single peer. Fails with `Capability` for a group that does not
    /// have exactly one other member, before any I/O.
    pub fn peer_inbox_id(&self) -> ParleyResult<InboxId> {
        match self {
            Self::Dm(dm) => dm.peer_inbox_id(),
            Self::Group(group) => {
                let mut peers = group.peer_inbox_ids()?;
                match (peers.pop(), peers.is_empty()) {
                    (Some(peer), true) => Ok(peer),
                    _ => Err(ParleyError::capability(format!(
                        "group {} does not have exactly one peer",
                        group.id()
                    ))),
                }
            }
        }
    }

    pub async fn update_name(&self, name: impl Into<String>) -> ParleyResult<()> {
        self.group_only("update_name")?.update_name(name).await
    }

    pub async fn add_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.group_only("add_members")?.add_members(inbox_ids).await
    }

    pub async fn remove_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.group_only("remove_members")?.remove_members(inbox_ids).await
    }

    // ── Streaming ──

    pub fn stream_messages(&self) -> ItemStream<Message> {
        match self {
            Self::Group(group) => group.stream_messages(),
            Self::Dm(dm) => dm.stream_messages(),
        }
    }
}

impl From<Group> for Conversation {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

impl From<Dm> for Conversation {
    fn from(dm: Dm) -> Self {
        Self::Dm(dm)
    }
}

impl PartialEq for Conversation {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Conversation {}

impl Hash for Conversation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().to_hex().hash(state);
    }
}
