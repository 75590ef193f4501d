//! Messages, query options and disappearing-message policy.

use crate::content::{ContentCodec, EncodedContent};
use parley_types::{ConsentState, ConversationId, InboxId, ParleyError, ParleyResult, SortDirection};
use serde::{Deserialize, Serialize};

/// Native message identifier (hex).
pub type MessageId = String;

/// Transmission state of a message as seen locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Staged or queued, not yet confirmed by a sync.
    Unpublished,
    Published,
    Failed,
}

/// A decrypted message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_inbox_id: InboxId,
    pub sent_at_ns: i64,
    pub content: EncodedContent,
    pub delivery_status: DeliveryStatus,
}

impl Message {
    /// Decodes the content with `codec`, checking the content type first.
    pub fn decode<C: ContentCodec>(&self, codec: &C) -> ParleyResult<C::Content> {
        let expected = codec.content_type();
        if !expected.same_type(&self.content.content_type) {
            return Err(ParleyError::Encoding(format!(
                "message {} has content type {}, expected {expected}",
                self.id, self.content.content_type
            )));
        }
        codec.decode(&self.content)
    }

    pub fn fallback(&self) -> Option<&str> {
        self.content.fallback.as_deref()
    }
}

/// Filters for [`crate::Conversation::messages`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListMessagesOptions {
    pub sent_before_ns: Option<i64>,
    pub sent_after_ns: Option<i64>,
    pub limit: Option<usize>,
    pub direction: SortDirection,
    /// `None` returns messages in any state.
    pub delivery_status: Option<DeliveryStatus>,
}

impl ListMessagesOptions {
    pub fn with_status(status: DeliveryStatus) -> Self {
        Self {
            delivery_status: Some(status),
            ..Default::default()
        }
    }

    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            direction: SortDirection::Descending,
            ..Default::default()
        }
    }

    /// Whether `message` passes every filter except `limit`.
    pub fn matches(&self, message: &Message) -> bool {
        self.sent_before_ns.is_none_or(|t| message.sent_at_ns < t)
            && self.sent_after_ns.is_none_or(|t| message.sent_at_ns > t)
            && self
                .delivery_status
                .is_none_or(|status| message.delivery_status == status)
    }
}

/// Messages sent after `disappear_starting_at_ns` are deleted once they are
/// `retention_duration_ns` old.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisappearingMessageSettings {
    pub disappear_starting_at_ns: i64,
    pub retention_duration_ns: i64,
}

impl DisappearingMessageSettings {
    pub fn new(disappear_starting_at_ns: i64, retention_duration_ns: i64) -> Self {
        Self {
            disappear_starting_at_ns,
            retention_duration_ns,
        }
    }

    pub(crate) fn validate(&self) -> ParleyResult<()> {
        if self.retention_duration_ns <= 0 {
            return Err(ParleyError::capability(format!(
                "retention duration must be positive, got {}ns",
                self.retention_duration_ns
            )));
        }
        Ok(())
    }
}

/// A member of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub inbox_id: InboxId,
    pub permission_level: PermissionLevel,
    pub consent_state: ConsentState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Member,
    Admin,
    SuperAdmin,
}
