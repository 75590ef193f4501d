//! Typed message content and codecs.

use parley_types::{ParleyError, ParleyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a content type, e.g. `parley.org/text:1.0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentTypeId {
    pub authority_id: String,
    pub type_id: String,
    pub version_major: u32,
    pub version_minor: u32,
}

impl ContentTypeId {
    pub fn new(authority_id: &str, type_id: &str, version_major: u32, version_minor: u32) -> Self {
        Self {
            authority_id: authority_id.to_string(),
            type_id: type_id.to_string(),
            version_major,
            version_minor,
        }
    }

    /// Same authority and type, any version.
    pub fn same_type(&self, other: &ContentTypeId) -> bool {
        self.authority_id == other.authority_id && self.type_id == other.type_id
    }
}

impl fmt::Display for ContentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}.{}",
            self.authority_id, self.type_id, self.version_major, self.version_minor
        )
    }
}

/// Content as carried by the native engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedContent {
    pub content_type: ContentTypeId,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Plain-text stand-in for clients that lack the codec.
    pub fallback: Option<String>,
    pub content: Vec<u8>,
}

/// Encodes and decodes one content type.
pub trait ContentCodec: Send + Sync {
    type Content;

    fn content_type(&self) -> ContentTypeId;

    fn encode(&self, content: &Self::Content) -> ParleyResult<EncodedContent>;

    fn decode(&self, encoded: &EncodedContent) -> ParleyResult<Self::Content>;

    fn fallback(&self, _content: &Self::Content) -> Option<String> {
        None
    }
}

/// UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCodec;

impl TextCodec {
    pub fn content_type_id() -> ContentTypeId {
        ContentTypeId::new("parley.org", "text", 1, 0)
    }
}

impl ContentCodec for TextCodec {
    type Content = String;

    fn content_type(&self) -> ContentTypeId {
        Self::content_type_id()
    }

    fn encode(&self, content: &String) -> ParleyResult<EncodedContent> {
        let mut parameters = BTreeMap::new();
        parameters.insert("encoding".to_string(), "UTF-8".to_string());
        Ok(EncodedContent {
            content_type: self.content_type(),
            parameters,
            fallback: None,
            content: content.as_bytes().to_vec(),
        })
    }

    fn decode(&self, encoded: &EncodedContent) -> ParleyResult<String> {
        if let Some(encoding) = encoded.parameters.get("encoding") {
            if !encoding.eq_ignore_ascii_case("utf-8") {
                return Err(ParleyError::Encoding(format!(
                    "unsupported text encoding {encoding}"
                )));
            }
        }
        String::from_utf8(encoded.content.clone())
            .map_err(|e| ParleyError::Encoding(format!("text is not valid UTF-8: {e}")))
    }
}
