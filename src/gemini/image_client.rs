use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    models::{GenerateContentResponse, ImageCall, ImagePayload},
    traits::{CredentialProvider, ImageBackend},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_base: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiImageClient {
    pub fn new(config: &GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StudioError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model_id)
    }

    pub fn build_payload(call: &ImageCall) -> Value {
        let mut image_config = json!({
            "aspectRatio": call.wire_aspect_ratio().as_str(),
        });
        if let Some(size) = call.tier.image_size_hint() {
            image_config["imageSize"] = json!(size);
        }

        json!({
            "contents": [{
                "parts": [{ "text": call.prompt }]
            }],
            "generationConfig": {
                "seed": call.seed,
                "responseModalities": ["IMAGE"],
                "imageConfig": image_config
            }
        })
    }

    /// First inline image of the first candidate that was not blocked.
    pub fn extract_image(response: GenerateContentResponse) -> Result<ImagePayload> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            log::warn!("Prompt blocked by provider: {}", reason);
            return Err(StudioError::SafetyBlocked);
        }

        let mut blocked = false;
        for candidate in response.candidates {
            if candidate.is_safety_blocked() {
                blocked = true;
                continue;
            }

            let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
            for part in parts {
                if let Some(inline) = part.inline_data {
                    match inline.data.as_deref() {
                        Some(data) if !data.is_empty() => {
                            return Ok(ImagePayload::from_base64(
                                inline.mime_type.as_deref(),
                                data,
                            ));
                        }
                        _ => continue,
                    }
                }
            }
        }

        if blocked {
            Err(StudioError::SafetyBlocked)
        } else {
            Err(StudioError::NoImageData)
        }
    }
}

#[async_trait]
impl ImageBackend for GeminiImageClient {
    async fn generate_image(&self, call: &ImageCall) -> Result<ImagePayload> {
        let api_key = self
            .credentials
            .api_key()
            .await
            .ok_or_else(|| StudioError::AccessDenied("API Key not available.".into()))?;

        let model_id = call.tier.model_id();
        let payload = Self::build_payload(call);

        log::info!(
            "Generating image {} with model: {} (seed {}, ratio {})",
            call.index + 1,
            model_id,
            call.seed,
            call.wire_aspect_ratio()
        );
        log::debug!("Image generation request payload: {}", payload);

        let response = self
            .client
            .post(self.endpoint(model_id))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StudioError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Gemini returned {}: {}", status, message);
            return Err(StudioError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| StudioError::ResponseError(e.to_string()))?;

        Self::extract_image(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, ModelTier};

    fn call(tier: ModelTier, ratio: AspectRatio) -> ImageCall {
        ImageCall {
            tier,
            prompt: "a quiet harbour".into(),
            aspect_ratio: ratio,
            seed: 1234,
            index: 0,
        }
    }

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_payload_uses_remapped_ratio() {
        let payload = GeminiImageClient::build_payload(&call(ModelTier::Fast, AspectRatio::Classic));
        assert_eq!(payload["generationConfig"]["imageConfig"]["aspectRatio"], "4:3");
        assert_eq!(payload["generationConfig"]["seed"], 1234);
        assert!(payload["generationConfig"]["imageConfig"]
            .get("imageSize")
            .is_none());
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "a quiet harbour");
    }

    #[test]
    fn test_payload_high_quality_size_hint() {
        let payload =
            GeminiImageClient::build_payload(&call(ModelTier::HighQuality, AspectRatio::Social));
        assert_eq!(payload["generationConfig"]["imageConfig"]["imageSize"], "2K");
        assert_eq!(payload["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
    }

    #[test]
    fn test_extract_skips_blocked_candidate() {
        let body = parse(
            r#"{"candidates": [
                {"finishReason": "SAFETY"},
                {"finishReason": "STOP", "content": {"parts": [
                    {"inlineData": {"mimeType": "image/jpeg", "data": "QUJD"}}
                ]}}
            ]}"#,
        );
        let payload = GeminiImageClient::extract_image(body).unwrap();
        assert_eq!(payload.as_str(), "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn test_extract_reports_safety_block() {
        let body = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        assert!(matches!(
            GeminiImageClient::extract_image(body),
            Err(StudioError::SafetyBlocked)
        ));

        let body = parse(r#"{"promptFeedback": {"blockReason": "OTHER"}}"#);
        assert!(matches!(
            GeminiImageClient::extract_image(body),
            Err(StudioError::SafetyBlocked)
        ));
    }

    #[test]
    fn test_extract_without_image() {
        let body = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "no can do"}]}}]}"#,
        );
        assert!(matches!(
            GeminiImageClient::extract_image(body),
            Err(StudioError::NoImageData)
        ));
    }
}
