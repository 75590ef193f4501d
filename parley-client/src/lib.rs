//! Parley messaging client.
//!
//! [`Client`] ties together the pieces an application talks to:
//! - the [`Conversations`] facade over the native engine
//! - the consent preference log ([`ConsentList`])
//! - a process-wide cache of gateway connections ([`ApiClientCache`])
//!
//! The native protocol engine is supplied by the caller through
//! [`NativeClient`].

pub mod api_cache;
pub mod client;
pub mod config;
pub mod logging;
pub mod native;

pub use api_cache::ApiClientCache;
pub use client::Client;
pub use config::{ApiOptions, ClientOptions, Environment};
pub use logging::{LogLevel, init_logging};
pub use native::NativeClient;

pub use parley_consent::{ConsentList, PreferencesConfig};
pub use parley_conversations::{Conversation, Conversations, Dm, Group};
pub use parley_crypto::SecretBytes;
pub use parley_types::{ConsentEntry, ConsentState, EntityKind, ParleyError, ParleyResult};
