use crate::error::ParleyResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network-assigned identity of an inbox (hex string).
pub type InboxId = String;

/// Opaque identifier of a native conversation.
///
/// Compared and hashed through its bytes, displayed as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(Vec<u8>);

impl ConversationId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> ParleyResult<Self> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConversationId({})", self.to_hex())
    }
}

impl From<Vec<u8>> for ConversationId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
