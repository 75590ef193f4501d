use serde::{Deserialize, Serialize};
use std::fmt;

/// A consent decision about a conversation, address or inbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    Allowed,
    Denied,
    #[default]
    Unknown,
}

/// What a consent decision applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Address,
    GroupId,
    InboxId,
}

impl EntityKind {
    /// Key prefix used by the consent entries map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "ADDRESS",
            Self::GroupId => "GROUP_ID",
            Self::InboxId => "INBOX_ID",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One consent decision, keyed by `(entity_kind, value)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentEntry {
    pub entity_kind: EntityKind,
    pub value: String,
    pub state: ConsentState,
}

impl ConsentEntry {
    pub fn new(entity_kind: EntityKind, value: impl Into<String>, state: ConsentState) -> Self {
        Self {
            entity_kind,
            value: value.into(),
            state,
        }
    }

    pub fn address(value: impl Into<String>, state: ConsentState) -> Self {
        Self::new(EntityKind::Address, value, state)
    }

    pub fn group_id(value: impl Into<String>, state: ConsentState) -> Self {
        Self::new(EntityKind::GroupId, value, state)
    }

    pub fn inbox_id(value: impl Into<String>, state: ConsentState) -> Self {
        Self::new(EntityKind::InboxId, value, state)
    }

    /// Map key, e.g. `ADDRESS-0xabc`.
    pub fn key(&self) -> String {
        Self::key_for(self.entity_kind, &self.value)
    }

    pub fn key_for(kind: EntityKind, value: &str) -> String {
        format!("{kind}-{value}")
    }
}
