use crate::error::{Result, StudioError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_MIME: &str = "image/png";

/// Self-describing `data:<mime>;base64,<payload>` image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn from_base64(mime_type: Option<&str>, data: &str) -> Self {
        let mime = mime_type.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_MIME);
        ImagePayload(format!("data:{};base64,{}", mime, data))
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(Some(mime_type), &STANDARD.encode(bytes))
    }

    pub fn parse(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with("data:") || !uri.contains(";base64,") {
            return Err(StudioError::DecodeError(
                "payload is not a base64 data URI".into(),
            ));
        }
        Ok(ImagePayload(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the full URI string.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base64_data().is_empty()
    }

    pub fn mime_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(";base64,").next())
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME)
    }

    pub fn base64_data(&self) -> &str {
        self.0
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or("")
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64_data())
            .map_err(|e| StudioError::DecodeError(e.to_string()))
    }
}

impl TryFrom<String> for ImagePayload {
    type Error = StudioError;

    fn try_from(uri: String) -> Result<Self> {
        Self::parse(uri)
    }
}

impl From<ImagePayload> for String {
    fn from(payload: ImagePayload) -> Self {
        payload.0
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} chars)", self.mime_type(), self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetadata {
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub passed_quality_check: bool,
    pub check_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub url: ImagePayload,
    pub prompt: String,
    pub timestamp: i64,
    pub metadata: Option<QualityMetadata>,
}

// Gemini generateContent response, reduced to what image extraction reads.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub finish_reason: Option<String>,
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPart {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl Candidate {
    pub fn is_safety_blocked(&self) -> bool {
        self.finish_reason.as_deref() == Some("SAFETY")
    }
}
