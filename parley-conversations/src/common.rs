//! Operations shared by [`crate::Group`] and [`crate::Dm`].

use crate::content::ContentCodec;
use crate::message::{ListMessagesOptions, Message, MessageId};
use crate::native::NativeConversation;
use crate::stream::{Emitter, ItemStream, open_stream};
use parley_types::{ConversationId, ParleyResult};
use std::sync::Arc;

pub(crate) fn topic_for(id: &ConversationId) -> String {
    format!("/parley/mls/1/g-{}/proto", id.to_hex())
}

pub(crate) async fn send_with<C: ContentCodec>(
    native: &dyn NativeConversation,
    codec: &C,
    content: &C::Content,
) -> ParleyResult<MessageId> {
    let mut encoded = codec.encode(content)?;
    if encoded.fallback.is_none() {
        encoded.fallback = codec.fallback(content);
    }
    native.send(encoded).await
}

pub(crate) fn prepare_with<C: ContentCodec>(
    native: &dyn NativeConversation,
    codec: &C,
    content: &C::Content,
) -> ParleyResult<MessageId> {
    let mut encoded = codec.encode(content)?;
    if encoded.fallback.is_none() {
        encoded.fallback = codec.fallback(content);
    }
    native.send_optimistic(encoded)
}

pub(crate) async fn last_message(native: &dyn NativeConversation) -> ParleyResult<Option<Message>> {
    let mut latest = native.find_messages(ListMessagesOptions::latest(1)).await?;
    Ok(latest.pop())
}

pub(crate) fn stream_messages(native: Arc<dyn NativeConversation>) -> ItemStream<Message> {
    open_stream(move |emitter: Emitter<Message>| async move {
        native.stream(Arc::new(emitter)).await
    })
}

/// Expands to the methods every conversation variant exposes. Expects a
/// `native: Arc<dyn NativeConversation>` field.
macro_rules! conversation_common {
    () => {
        pub fn id(&self) -> parley_types::ConversationId {
            self.native.id()
        }

        pub fn topic(&self) -> String {
            $crate::common::topic_for(&self.native.id())
        }

        pub fn created_at_ns(&self) -> i64 {
            self.native.created_at_ns()
        }

        // ── Sending ──

        /// Encodes `content` with `codec` and sends it.
        pub async fn send<C: $crate::ContentCodec>(
            &self,
            codec: &C,
            content: &C::Content,
        ) -> parley_types::ParleyResult<$crate::MessageId> {
            $crate::common::send_with(self.native.as_ref(), codec, content).await
        }

        pub async fn send_text(&self, text: &str) -> parley_types::ParleyResult<$crate::MessageId> {
            self.send(&$crate::TextCodec, &text.to_string()).await
        }

        pub async fn send_encoded(
            &self,
            content: $crate::EncodedContent,
        ) -> parley_types::ParleyResult<$crate::MessageId> {
            self.native.send(content).await
        }

        /// Stages `content` locally. Nothing is transmitted until
        /// [`Self::publish_messages`].
        pub fn prepare_message<C: $crate::ContentCodec>(
            &self,
            codec: &C,
            content: &C::Content,
        ) -> parley_types::ParleyResult<$crate::MessageId> {
            $crate::common::prepare_with(self.native.as_ref(), codec, content)
        }

        pub fn prepare_text(&self, text: &str) -> parley_types::ParleyResult<$crate::MessageId> {
            self.prepare_message(&$crate::TextCodec, &text.to_string())
        }

        pub async fn publish_messages(&self) -> parley_types::ParleyResult<()> {
            self.native.publish_messages().await
        }

        pub async fn publish_message(&self, id: &str) -> parley_types::ParleyResult<()> {
            self.native.publish_message(id).await
        }

        // ── Reading ──

        pub async fn messages(
            &self,
            options: $crate::ListMessagesOptions,
        ) -> parley_types::ParleyResult<Vec<$crate::Message>> {
            self.native.find_messages(options).await
        }

        pub async fn last_message(&self) -> parley_types::ParleyResult<Option<$crate::Message>> {
            $crate::common::last_message(self.native.as_ref()).await
        }

        pub async fn sync(&self) -> parley_types::ParleyResult<()> {
            self.native.sync().await
        }

        pub async fn members(&self) -> parley_types::ParleyResult<Vec<$crate::Member>> {
            self.native.members().await
        }

        // ── Consent ──

        pub fn consent_state(&self) -> parley_types::ParleyResult<parley_types::ConsentState> {
            self.native.consent_state()
        }

        pub async fn update_consent_state(
            &self,
            state: parley_types::ConsentState,
        ) -> parley_types::ParleyResult<()> {
            self.native.update_consent_state(state).await
        }

        // ── Disappearing messages ──

        pub fn disappearing_message_settings(
            &self,
        ) -> parley_types::ParleyResult<Option<$crate::DisappearingMessageSettings>> {
            self.native.disappearing_settings()
        }

        pub fn is_disappearing_messages_enabled(&self) -> parley_types::ParleyResult<bool> {
            Ok(self.native.disappearing_settings()?.is_some())
        }

        /// Replaces the policy. A non-positive retention is rejected before
        /// reaching the engine.
        pub async fn update_disappearing_message_settings(
            &self,
            settings: $crate::DisappearingMessageSettings,
        ) -> parley_types::ParleyResult<()> {
            settings.validate()?;
            self.native.update_disappearing_settings(settings).await
        }

        pub async fn clear_disappearing_message_settings(&self) -> parley_types::ParleyResult<()> {
            self.native.remove_disappearing_settings().await
        }

        // ── Streaming ──

        /// New messages in this conversation, as a lazy cancellable stream.
        pub fn stream_messages(&self) -> $crate::ItemStream<$crate::Message> {
            $crate::common::stream_messages(self.native.clone())
        }
    };
}

pub(crate) use conversation_common;
