//! One-to-one conversations.

use crate::common::conversation_common;
use crate::native::NativeConversation;
use parley_types::{InboxId, ParleyError, ParleyResult};
use std::sync::Arc;

/// A direct conversation with exactly one peer.
#[derive(Clone)]
pub struct Dm {
    native: Arc<dyn NativeConversation>,
}

impl Dm {
    pub(crate) fn new(native: Arc<dyn NativeConversation>) -> Self {
        Self { native }
    }

    conversation_common!();

    pub fn peer_inbox_id(&self) -> ParleyResult<InboxId> {
        self.native
            .dm_peer_inbox_id()
            .ok_or_else(|| ParleyError::transport(format!("dm {} has no peer inbox id", self.native.id())))
    }
}

impl std::fmt::Debug for Dm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dm").field("id", &self.native.id()).finish()
    }
}
