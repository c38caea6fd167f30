//! Gemini `generateContent` client.
//!
//! Sends the base image (when present), the decoration image, and the
//! instruction text as one multimodal request and takes the first inline
//! image from the response. Text parts are logged and skipped.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::generator::{Generator, GeneratorError};

/// Model the service generates with.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini generator.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key; an empty key is tolerated at construction and fails at
    /// request time.
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    /// Overall per-request timeout. Generation is slow; this is the only
    /// cancellation the call has.
    pub timeout: Duration,
    pub image_size: String,
    pub aspect_ratio: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
            image_size: "1K".to_string(),
            aspect_ratio: "9:16".to_string(),
        }
    }
}

/// [`Generator`] implementation over the Gemini REST API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GeneratorError> {
        if config.api_key.is_empty() {
            warn!("generator API key is not set; generation requests will fail");
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GeneratorError::Request {
                reason: err.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Assemble the request body: base image first (when present), then
    /// the decoration, then the instruction.
    fn build_request(
        &self,
        base: Option<&Bytes>,
        input: &Bytes,
        input_mime: &str,
        instruction: &str,
    ) -> Value {
        let mut parts = Vec::new();
        if let Some(base) = base {
            parts.push(json!({
                "inlineData": { "mimeType": "image/png", "data": BASE64.encode(base) }
            }));
        }
        parts.push(json!({
            "inlineData": { "mimeType": input_mime, "data": BASE64.encode(input) }
        }));
        parts.push(json!({ "text": instruction }));

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"],
                "imageConfig": {
                    "imageSize": self.config.image_size,
                    "aspectRatio": self.config.aspect_ratio,
                },
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: Option<String>,
}

/// Pull the first inline image out of a response body.
fn first_image(response: &GenerateContentResponse) -> Result<Option<Bytes>, GeneratorError> {
    for candidate in response.candidates.iter().flatten() {
        let parts = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.as_ref());
        for part in parts.into_iter().flatten() {
            if let Some(data) = part.inline_data.as_ref().and_then(|d| d.data.as_ref()) {
                let decoded = BASE64.decode(data).map_err(|err| GeneratorError::Malformed {
                    reason: format!("inline image is not valid base64: {err}"),
                })?;
                return Ok(Some(Bytes::from(decoded)));
            }
            if let Some(text) = &part.text {
                debug!(text, "generator returned text part");
            }
        }
    }
    Ok(None)
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        base: Option<Bytes>,
        input: Bytes,
        input_mime: &str,
        instruction: &str,
    ) -> Result<Option<Bytes>, GeneratorError> {
        let body = self.build_request(base.as_ref(), &input, input_mime, instruction);
        debug!(model = %self.config.model, has_base = base.is_some(), "calling generator");

        let response = self
            .client
            .post(self.request_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| GeneratorError::Request {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Request {
                reason: format!("generator returned {status}"),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|err| GeneratorError::Malformed {
                reason: err.to_string(),
            })?;
        first_image(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_generator() -> GeminiGenerator {
        GeminiGenerator::new(GeminiConfig::new("test-key")).unwrap()
    }

    #[test]
    fn request_url_targets_the_configured_model() {
        let gen = test_generator();
        assert_eq!(
            gen.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
    }

    #[test]
    fn request_parts_are_base_then_input_then_text() {
        let gen = test_generator();
        let base = Bytes::from_static(b"base");
        let input = Bytes::from_static(b"decoration");
        let body = gen.build_request(Some(&base), &input, "image/jpeg", "combine");

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts.as_array().unwrap().len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(
            parts[1]["inlineData"]["data"],
            BASE64.encode(b"decoration")
        );
        assert_eq!(parts[2]["text"], "combine");
    }

    #[test]
    fn request_without_base_has_two_parts() {
        let gen = test_generator();
        let input = Bytes::from_static(b"decoration");
        let body = gen.build_request(None, &input, "image/png", "combine");

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[0]["inlineData"].is_object());
        assert_eq!(parts[1]["text"], "combine");
    }

    #[test]
    fn request_carries_image_generation_config() {
        let gen = test_generator();
        let body = gen.build_request(None, &Bytes::from_static(b"x"), "image/png", "t");
        assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], "1K");
        assert_eq!(
            body["generationConfig"]["imageConfig"]["aspectRatio"],
            "9:16"
        );
    }

    #[test]
    fn first_image_decodes_inline_data() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "here is your image" },
                    { "inlineData": { "mimeType": "image/png", "data": BASE64.encode(b"pixels") } }
                ]}
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let image = first_image(&parsed).unwrap().unwrap();
        assert_eq!(image.as_ref(), b"pixels");
    }

    #[test]
    fn text_only_response_yields_none() {
        let raw = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "cannot comply" }] } }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(first_image(&parsed).unwrap().is_none());
    }

    #[test]
    fn empty_response_yields_none() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(first_image(&parsed).unwrap().is_none());
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": "!!! not base64 !!!" } }] }
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let err = first_image(&parsed).unwrap_err();
        assert!(matches!(err, GeneratorError::Malformed { .. }));
    }
}
