//! Core types shared across the Parley crates.
//!
//! - [`ParleyError`]: the error taxonomy every public operation reports
//! - [`ConversationId`]: opaque native conversation identifier
//! - [`ConsentState`] / [`EntityKind`]: the vocabulary of consent decisions

mod consent;
mod error;
mod id;
mod paging;
mod time;

pub use consent::{ConsentEntry, ConsentState, EntityKind};
pub use error::{ParleyError, ParleyResult};
pub use id::{ConversationId, InboxId};
pub use paging::SortDirection;
pub use time::{now_ns, ns_to_datetime};
