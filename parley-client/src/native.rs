//! Client-level surface of the native protocol engine.

use async_trait::async_trait;
use parley_conversations::NativeConversations;
use parley_types::{ConsentEntry, ConsentState, EntityKind, InboxId, ParleyResult};
use std::sync::Arc;

/// One registered installation inside the native engine.
#[async_trait]
pub trait NativeClient: Send + Sync {
    fn inbox_id(&self) -> InboxId;

    fn installation_id(&self) -> String;

    fn conversations(&self) -> Arc<dyn NativeConversations>;

    /// Records consent decisions in the engine's own store.
    async fn set_consent_states(&self, entries: Vec<ConsentEntry>) -> ParleyResult<()>;

    async fn get_consent_state(&self, kind: EntityKind, value: &str) -> ParleyResult<ConsentState>;
}
