//! Consent preferences backed by an encrypted, append-only network log.
//!
//! Each identity owns a private log topic. Every change to consent is
//! published as one encrypted [`PreferenceLogEvent`]; loading replays the
//! whole log in order into an in-memory map where the last write wins.
//!
//! # Architecture
//!
//! - [`ConsentList`]: the synchronizer (load, local allow/deny, bulk
//!   publish, pure state lookups)
//! - [`EntriesMap`]: lock-guarded key→entry map, the only shared mutable state
//! - [`EnvelopeLog`]: the network capability (paged fetch + append)
//! - [`HttpEnvelopeLog`]: a reqwest implementation against a JSON gateway

pub mod config;
pub mod consent_list;
pub mod entries;
pub mod http_log;
pub mod log;
pub mod types;

pub use config::{HttpLogConfig, PreferencesConfig};
pub use consent_list::ConsentList;
pub use entries::EntriesMap;
pub use http_log::HttpEnvelopeLog;
pub use log::EnvelopeLog;
pub use parley_types::ConsentEntry;
pub use types::{
    Cursor, EnvelopePage, EnvelopeQuery, LogEnvelope, PreferenceLogEvent,
    SortDirection,
};
