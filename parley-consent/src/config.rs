//! Preference synchronizer and HTTP log configuration.

use serde::{Deserialize, Serialize};

/// Default number of envelopes requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Paging behaviour of [`crate::ConsentList::load`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Envelopes requested per page.
    pub page_size: u32,

    /// Stop after this many envelopes. `None` reads to the end of the log.
    pub result_limit: Option<usize>,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            result_limit: None,
        }
    }
}

/// Connection settings for [`crate::HttpEnvelopeLog`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLogConfig {
    /// Gateway base URL (e.g., "https://preferences.parley.im").
    pub base_url: String,

    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpLogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5556".to_string(),
            timeout_secs: 30,
        }
    }
}
