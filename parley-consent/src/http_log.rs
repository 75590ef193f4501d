//! HTTP adapter for the preference log gateway.
//!
//! Speaks a small JSON API:
//! - `GET  /v1/envelopes?topic=..&after_ns=..&cursor=..&limit=..&direction=..`
//! - `POST /v1/envelopes`
//! - `GET  /health`
//!
//! Envelope payloads travel base64-encoded.

use crate::config::HttpLogConfig;
use crate::log::EnvelopeLog;
use crate::types::{Cursor, EnvelopePage, EnvelopeQuery, LogEnvelope, SortDirection};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parley_types::{ParleyError, ParleyResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Envelope log reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpEnvelopeLog {
    client: Client,
    config: HttpLogConfig,
}

#[derive(Serialize)]
struct FetchParams<'a> {
    topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_ns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    limit: u32,
    direction: SortDirection,
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    topic: String,
    timestamp_ns: i64,
    message: String,
}

#[derive(Deserialize)]
struct WirePage {
    #[serde(default)]
    envelopes: Vec<WireEnvelope>,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl WireEnvelope {
    fn encode(envelope: &LogEnvelope) -> Self {
        Self {
            topic: envelope.topic.clone(),
            timestamp_ns: envelope.timestamp_ns,
            message: BASE64.encode(&envelope.message),
        }
    }

    fn decode(self) -> ParleyResult<LogEnvelope> {
        let message = BASE64
            .decode(self.message.as_bytes())
            .map_err(|e| ParleyError::Encoding(format!("invalid base64 envelope: {e}")))?;
        Ok(LogEnvelope {
            topic: self.topic,
            timestamp_ns: self.timestamp_ns,
            message,
        })
    }
}

fn transport(err: reqwest::Error) -> ParleyError {
    ParleyError::Transport(err.to_string())
}

impl HttpEnvelopeLog {
    pub fn new(config: HttpLogConfig) -> ParleyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ParleyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Returns true if the gateway answers its health check.
    pub async fn is_connected(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("health check against {} failed: {e}", self.config.base_url);
                false
            }
        }
    }
}

#[async_trait]
impl EnvelopeLog for HttpEnvelopeLog {
    async fn fetch_envelopes(&self, query: EnvelopeQuery) -> ParleyResult<EnvelopePage> {
        let params = FetchParams {
            topic: &query.topic,
            after_ns: query.after_ns,
            cursor: query.cursor.as_ref().map(|c| c.0.as_str()),
            limit: query.page_size,
            direction: query.direction,
        };

        let body = self
            .client
            .get(self.url("/v1/envelopes"))
            .query(&params)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;

        let page: WirePage = serde_json::from_slice(&body)?;
        let envelopes = page
            .envelopes
            .into_iter()
            .map(WireEnvelope::decode)
            .collect::<ParleyResult<Vec<_>>>()?;

        Ok(EnvelopePage {
            envelopes,
            next_cursor: page.next_cursor.map(Cursor),
        })
    }

    async fn publish(&self, envelope: LogEnvelope) -> ParleyResult<()> {
        self.client
            .post(self.url("/v1/envelopes"))
            .json(&WireEnvelope::encode(&envelope))
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;

        debug!("appended envelope to {}", envelope.topic);
        Ok(())
    }
}
