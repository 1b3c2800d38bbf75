use crate::{
    error::{Result, StudioError},
    models::common::{AspectRatio, ModelTier, StylePreset},
};
use serde::{Deserialize, Serialize};

pub const MIN_IMAGES: u32 = 1;
pub const MAX_IMAGES: u32 = 4;
pub const MAX_PROMPT_WORDS: usize = 700;

/// Clamp a requested image count into the supported batch range.
pub fn clamp_count(count: i64) -> u32 {
    count.clamp(MIN_IMAGES as i64, MAX_IMAGES as i64) as u32
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub tier: ModelTier,
    pub aspect_ratio: AspectRatio,
    pub count: u32,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            prompt: String::new(),
            style: StylePreset::default().descriptor().to_string(),
            tier: ModelTier::default(),
            aspect_ratio: AspectRatio::default(),
            count: 1,
        }
    }
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_style_preset(mut self, preset: StylePreset) -> Self {
        self.style = preset.descriptor().to_string();
        self
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn clamped_count(&self) -> u32 {
        clamp_count(self.count as i64)
    }

    /// Checks the prompt before anything is sent to the service.
    pub fn validate(&self, max_words: usize) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(StudioError::ValidationError(
                "Please enter a prompt.".to_string(),
            ));
        }

        if word_count(&self.prompt) > max_words {
            return Err(StudioError::ValidationError(format!(
                "Prompt exceeds the {} word limit. Please shorten your description.",
                max_words
            )));
        }

        Ok(())
    }
}

/// Structured override typed in by the user in JSON mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl GenerationOverride {
    pub fn parse(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| {
            log::debug!("Rejected override input: {}", e);
            StudioError::ValidationError("Invalid JSON format. Please check your syntax.".to_string())
        })
    }

    /// Snapshot of a request in the shape the JSON editor starts from.
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            prompt: Some(request.prompt.clone()),
            style: Some(request.style.clone()),
            aspect_ratio: Some(request.aspect_ratio),
            count: Some(request.count as i64),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StudioError::SerializationError(e.to_string()))
    }

    /// Empty strings and a zero count leave the base value in place.
    pub fn apply_to(&self, mut request: GenerationRequest) -> GenerationRequest {
        if let Some(prompt) = self.prompt.as_ref().filter(|p| !p.is_empty()) {
            request.prompt = prompt.clone();
        }
        if let Some(style) = self.style.as_ref().filter(|s| !s.is_empty()) {
            request.style = style.clone();
        }
        if let Some(ratio) = self.aspect_ratio {
            request.aspect_ratio = ratio;
        }
        if let Some(count) = self.count.filter(|c| *c != 0) {
            request.count = clamp_count(count);
        }
        request
    }
}

/// One fully resolved call against the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCall {
    pub tier: ModelTier,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub seed: u32,
    pub index: usize,
}

impl ImageCall {
    pub fn wire_aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio.remap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_word_limit_boundary() {
        assert!(GenerationRequest::new(words(700))
            .validate(MAX_PROMPT_WORDS)
            .is_ok());

        let err = GenerationRequest::new(words(701))
            .validate(MAX_PROMPT_WORDS)
            .unwrap_err();
        assert!(matches!(err, StudioError::ValidationError(_)));
        assert!(err.to_string().contains("700 word limit"));
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let err = GenerationRequest::new("   \n\t").validate(MAX_PROMPT_WORDS);
        assert_eq!(err.unwrap_err().to_string(), "Please enter a prompt.");
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(-3), 1);
        assert_eq!(clamp_count(3), 3);
        assert_eq!(clamp_count(9), 4);
        assert_eq!(GenerationRequest::new("x").with_count(12).clamped_count(), 4);
    }

    #[test]
    fn test_override_applies_typed_fields() {
        let base = GenerationRequest::new("a lighthouse").with_count(1);
        let parsed = GenerationOverride::parse(
            r#"{"prompt": "a red fox", "aspectRatio": "3:2", "count": 10, "style": ""}"#,
        )
        .unwrap();

        let merged = parsed.apply_to(base.clone());
        assert_eq!(merged.prompt, "a red fox");
        assert_eq!(merged.aspect_ratio, AspectRatio::Classic);
        assert_eq!(merged.count, 4);
        assert_eq!(merged.style, base.style);
    }

    #[test]
    fn test_override_rejects_bad_input() {
        assert!(matches!(
            GenerationOverride::parse("{prompt: nope"),
            Err(StudioError::ValidationError(_))
        ));
        assert!(matches!(
            GenerationOverride::parse(r#"{"aspectRatio": "5:4"}"#),
            Err(StudioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_override_snapshot_round_trips_request() {
        let request = GenerationRequest::new("studio portrait")
            .with_aspect_ratio(AspectRatio::Tall)
            .with_count(2);
        let json = GenerationOverride::from_request(&request)
            .to_json_pretty()
            .unwrap();
        assert!(json.contains("\"aspectRatio\": \"9:16\""));

        let restored = GenerationOverride::parse(&json)
            .unwrap()
            .apply_to(GenerationRequest::default());
        assert_eq!(restored, request);
    }
}
