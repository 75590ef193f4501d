//! Options for creating and listing conversations.

use crate::message::DisappearingMessageSettings;
use crate::native::ConversationFilter;
use parley_types::ConsentState;
use serde::{Deserialize, Serialize};

/// Who may change group metadata and membership.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPermissionPreset {
    #[default]
    AllMembers,
    AdminOnly,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub permissions: GroupPermissionPreset,
    pub disappearing: Option<DisappearingMessageSettings>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConversationsOptions {
    pub created_after_ns: Option<i64>,
    pub created_before_ns: Option<i64>,
    pub limit: Option<usize>,
    /// `None` lists every consent state.
    pub consent_states: Option<Vec<ConsentState>>,
    pub filter: ConversationFilter,
}
