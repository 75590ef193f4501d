//! The conversation collection of one client.

use crate::conversation::Conversation;
use crate::dm::Dm;
use crate::group::Group;
use crate::message::Message;
use crate::native::{ConversationFilter, NativeConversation, NativeConversations};
use crate::options::{GroupOptions, ListConversationsOptions};
use crate::stream::{Emitter, ItemStream, open_stream};
use parley_types::{ConsentEntry, ConsentState, ConversationId, InboxId, ParleyError, ParleyResult};
use std::sync::Arc;
use tracing::debug;

/// Creates, lists and streams conversations.
#[derive(Clone)]
pub struct Conversations {
    native: Arc<dyn NativeConversations>,
    inbox_id: InboxId,
}

impl Conversations {
    pub fn new(native: Arc<dyn NativeConversations>, inbox_id: InboxId) -> Self {
        Self { native, inbox_id }
    }

    pub fn inbox_id(&self) -> &str {
        &self.inbox_id
    }

    fn wrap(&self, native: Arc<dyn NativeConversation>) -> Conversation {
        Conversation::from_native(native, &self.inbox_id)
    }

    // ── Create ──

    /// Creates a group with `inbox_ids` as the initial members. The local
    /// inbox is always a member and must not be listed.
    pub async fn new_group(&self, inbox_ids: Vec<InboxId>, options: GroupOptions) -> ParleyResult<Group> {
        if inbox_ids.iter().any(|id| *id == self.inbox_id) {
            return Err(ParleyError::capability("cannot add own inbox id to a new group"));
        }
        if let Some(settings) = &options.disappearing {
            settings.validate()?;
        }

        let member_count = inbox_ids.len();
        let native = self.native.create_group(inbox_ids, options).await?;
        debug!("created group {} with {member_count} members", native.id());
        Ok(Group::new(native, self.inbox_id.clone()))
    }

    /// Returns the existing DM with `inbox_id`, creating it if needed.
    pub async fn find_or_create_dm(&self, inbox_id: &str) -> ParleyResult<Dm> {
        if inbox_id == self.inbox_id {
            return Err(ParleyError::capability("cannot create a dm with own inbox id"));
        }
        let native = self.native.find_or_create_dm(inbox_id.to_string()).await?;
        Ok(Dm::new(native))
    }

    // ── Query ──

    pub async fn list(&self, options: ListConversationsOptions) -> ParleyResult<Vec<Conversation>> {
        let filter = options.filter;
        let natives = self.native.list(options).await?;
        Ok(natives
            .into_iter()
            .filter(|n| filter.includes(n.conversation_type()))
            .map(|n| self.wrap(n))
            .collect())
    }

    pub async fn list_groups(&self, options: ListConversationsOptions) -> ParleyResult<Vec<Group>> {
        let options = ListConversationsOptions {
            filter: ConversationFilter::Groups,
            ..options
        };
        Ok(self
            .list(options)
            .await?
            .into_iter()
            .filter_map(|c| match c {
                Conversation::Group(group) => Some(group),
                Conversation::Dm(_) => None,
            })
            .collect())
    }

    pub async fn list_dms(&self, options: ListConversationsOptions) -> ParleyResult<Vec<Dm>> {
        let options = ListConversationsOptions {
            filter: ConversationFilter::Dms,
            ..options
        };
        Ok(self
            .list(options)
            .await?
            .into_iter()
            .filter_map(|c| match c {
                Conversation::Dm(dm) => Some(dm),
                Conversation::Group(_) => None,
            })
            .collect())
    }

    pub fn find_conversation(&self, id: &ConversationId) -> ParleyResult<Option<Conversation>> {
        Ok(self.native.find(id)?.map(|n| self.wrap(n)))
    }

    /// Looks up a conversation by its topic string.
    pub fn find_conversation_by_topic(&self, topic: &str) -> ParleyResult<Option<Conversation>> {
        let Some(hex_id) = topic
            .strip_prefix("/parley/mls/1/g-")
            .and_then(|rest| rest.strip_suffix("/proto"))
        else {
            return Err(ParleyError::Encoding(format!("not a conversation topic: {topic}")));
        };
        self.find_conversation(&ConversationId::from_hex(hex_id)?)
    }

    // ── Sync ──

    /// Fetches new conversations (welcomes) from the network.
    pub async fn sync(&self) -> ParleyResult<()> {
        self.native.sync().await
    }

    /// Syncs every conversation in the given consent states.
    pub async fn sync_all_conversations(&self, consent_states: Option<Vec<ConsentState>>) -> ParleyResult<u32> {
        let synced = self.native.sync_all(consent_states).await?;
        debug!("synced {synced} conversations");
        Ok(synced)
    }

    // ── Streams ──

    /// Conversations created or joined after the stream starts.
    pub fn stream(&self, filter: ConversationFilter) -> ItemStream<Conversation> {
        let native = self.native.clone();
        let inbox_id = self.inbox_id.clone();
        open_stream(move |emitter: Emitter<Conversation>| async move {
            let callback = emitter.map(move |conversation: Arc<dyn NativeConversation>| {
                Conversation::from_native(conversation, &inbox_id)
            });
            native.stream(filter, Arc::new(callback)).await
        })
    }

    /// Messages across all conversations matching `filter`.
    pub fn stream_all_messages(&self, filter: ConversationFilter) -> ItemStream<Message> {
        let native = self.native.clone();
        open_stream(move |emitter: Emitter<Message>| async move {
            native.stream_all_messages(filter, Arc::new(emitter)).await
        })
    }

    /// Consent changes made by this or other installations.
    pub fn stream_consent(&self) -> ItemStream<Vec<ConsentEntry>> {
        let native = self.native.clone();
        open_stream(move |emitter: Emitter<Vec<ConsentEntry>>| async move {
            native.stream_consent(Arc::new(emitter)).await
        })
    }
}

impl std::fmt::Debug for Conversations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversations")
            .field("inbox_id", &self.inbox_id)
            .finish()
    }
}
