//! Wire and domain types for the preference log.

use parley_types::{ConsentEntry, ConsentState, EntityKind};
use serde::{Deserialize, Serialize};

pub use parley_types::SortDirection;

/// Decrypted payload of one log envelope.
///
/// Buckets are replayed in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceLogEvent {
    #[serde(default)]
    pub allow_address: Vec<String>,
    #[serde(default)]
    pub deny_address: Vec<String>,
    #[serde(default)]
    pub allow_group: Vec<String>,
    #[serde(default)]
    pub deny_group: Vec<String>,
    #[serde(default)]
    pub allow_inbox: Vec<String>,
    #[serde(default)]
    pub deny_inbox: Vec<String>,
}

impl PreferenceLogEvent {
    /// Buckets entries by kind and state. `Unknown` entries are skipped.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ConsentEntry>) -> Self {
        let mut event = Self::default();
        for entry in entries {
            let bucket = match (entry.entity_kind, entry.state) {
                (EntityKind::Address, ConsentState::Allowed) => &mut event.allow_address,
                (EntityKind::Address, ConsentState::Denied) => &mut event.deny_address,
                (EntityKind::GroupId, ConsentState::Allowed) => &mut event.allow_group,
                (EntityKind::GroupId, ConsentState::Denied) => &mut event.deny_group,
                (EntityKind::InboxId, ConsentState::Allowed) => &mut event.allow_inbox,
                (EntityKind::InboxId, ConsentState::Denied) => &mut event.deny_inbox,
                (_, ConsentState::Unknown) => continue,
            };
            bucket.push(entry.value.clone());
        }
        event
    }

    /// Expands the event into entries in replay order.
    pub fn actions(&self) -> Vec<ConsentEntry> {
        let buckets = [
            (EntityKind::Address, ConsentState::Allowed, &self.allow_address),
            (EntityKind::Address, ConsentState::Denied, &self.deny_address),
            (EntityKind::GroupId, ConsentState::Allowed, &self.allow_group),
            (EntityKind::GroupId, ConsentState::Denied, &self.deny_group),
            (EntityKind::InboxId, ConsentState::Allowed, &self.allow_inbox),
            (EntityKind::InboxId, ConsentState::Denied, &self.deny_inbox),
        ];

        buckets
            .into_iter()
            .flat_map(|(kind, state, values)| {
                values
                    .iter()
                    .map(move |value| ConsentEntry::new(kind, value.clone(), state))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.allow_address.is_empty()
            && self.deny_address.is_empty()
            && self.allow_group.is_empty()
            && self.deny_group.is_empty()
            && self.allow_inbox.is_empty()
            && self.deny_inbox.is_empty()
    }

    /// Total number of actions across all buckets.
    pub fn len(&self) -> usize {
        self.allow_address.len()
            + self.deny_address.len()
            + self.allow_group.len()
            + self.deny_group.len()
            + self.allow_inbox.len()
            + self.deny_inbox.len()
    }
}

/// One encrypted event as stored on the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEnvelope {
    pub topic: String,
    pub timestamp_ns: i64,
    /// `salt || nonce || ciphertext` of a serialized [`PreferenceLogEvent`].
    pub message: Vec<u8>,
}

/// Opaque forward cursor returned by the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(pub String);

/// Page request against a log topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeQuery {
    pub topic: String,
    /// Only envelopes strictly newer than this timestamp.
    pub after_ns: Option<i64>,
    pub cursor: Option<Cursor>,
    pub page_size: u32,
    pub direction: SortDirection,
}

/// One page of envelopes. `next_cursor` is `None` on the last page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopePage {
    pub envelopes: Vec<LogEnvelope>,
    pub next_cursor: Option<Cursor>,
}
