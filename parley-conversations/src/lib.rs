//! Conversations over the native messaging engine.
//!
//! - [`Conversation`]: closed sum of [`Group`] and [`Dm`], dispatching every
//!   operation to the variant
//! - [`Conversations`]: create, list, find and stream conversations
//! - [`ItemStream`]: bridge from native callback subscriptions to a
//!   cancellable [`futures::Stream`]
//!
//! The engine itself is reached only through the traits in [`native`].

mod common;
mod content;
mod conversation;
mod conversations;
mod dm;
mod group;
mod message;
pub mod native;
mod options;
pub mod stream;

pub use content::{ContentCodec, ContentTypeId, EncodedContent, TextCodec};
pub use conversation::Conversation;
pub use conversations::Conversations;
pub use dm::Dm;
pub use group::Group;
pub use message::{
    DeliveryStatus, DisappearingMessageSettings, ListMessagesOptions, Member, Message, MessageId,
    PermissionLevel,
};
pub use native::{ConversationFilter, ConversationType, NativeConversation, NativeConversations};
pub use options::{GroupOptions, GroupPermissionPreset, ListConversationsOptions};
pub use stream::{Emitter, ItemStream, StreamCallback, StreamCloser, StreamState, open_stream};
