//! Network capability for the preference log.

use crate::types::{EnvelopePage, EnvelopeQuery, LogEnvelope};
use async_trait::async_trait;
use parley_types::ParleyResult;

/// Paged, append-only envelope log.
///
/// Implementations surface network failures as [`parley_types::ParleyError::Transport`]
/// and must not retry.
#[async_trait]
pub trait EnvelopeLog: Send + Sync {
    async fn fetch_envelopes(&self, query: EnvelopeQuery) -> ParleyResult<EnvelopePage>;

    async fn publish(&self, envelope: LogEnvelope) -> ParleyResult<()>;
}
