//! Group conversations.

use crate::common::conversation_common;
use crate::native::NativeConversation;
use parley_types::{InboxId, ParleyResult};
use std::sync::Arc;

/// A multi-member conversation.
#[derive(Clone)]
pub struct Group {
    native: Arc<dyn NativeConversation>,
    self_inbox_id: InboxId,
}

impl Group {
    pub(crate) fn new(native: Arc<dyn NativeConversation>, self_inbox_id: InboxId) -> Self {
        Self {
            native,
            self_inbox_id,
        }
    }

    conversation_common!();

    pub fn name(&self) -> ParleyResult<String> {
        self.native.group_name()
    }

    pub async fn update_name(&self, name: impl Into<String>) -> ParleyResult<()> {
        self.native.update_group_name(name.into()).await
    }

    pub async fn add_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.native.add_members(inbox_ids).await
    }

    pub async fn remove_members(&self, inbox_ids: Vec<InboxId>) -> ParleyResult<()> {
        self.native.remove_members(inbox_ids).await
    }

    /// Every member except the local inbox, as last synced.
    pub fn peer_inbox_ids(&self) -> ParleyResult<Vec<InboxId>> {
        let mut members = self.native.member_inbox_ids()?;
        members.retain(|id| *id != self.self_inbox_id);
        Ok(members)
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group").field("id", &self.native.id()).finish()
    }
}
