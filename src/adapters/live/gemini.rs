//! Live adapter for the Gemini `generateContent` API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    api_error, ensure_credential, parse_body, parse_brief_content, usable_reference_image,
};
use crate::error::{GenerationError, Operation};
use crate::ports::provider::{
    BriefFuture, BriefRequest, GeneratedBrief, GenerationProvider, ThumbnailFuture,
    ThumbnailRequest, ThumbnailResult,
};
use crate::prompt::{system_instruction, thumbnail_prompt, user_prompt, OutputContract};

/// Default Gemini models endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live provider that calls the Google AI API directly.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    /// Create a provider against the given models endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url }
    }

    fn post(&self, model: &str, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", api_key)
    }

    async fn generate_content(
        &self,
        operation: Operation,
        model: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<String, GenerationError> {
        let response = self.post(model, api_key).json(body).send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(operation, status, &response_text));
        }
        Ok(response_text)
    }
}

impl GenerationProvider for GeminiProvider {
    fn generate_brief(&self, request: &BriefRequest) -> BriefFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let api_key = require_key(&request.model, request.credential.as_deref())?;
            let body = brief_body(&request);
            tracing::debug!(model = request.model.id, "requesting brief from Gemini");

            let response_text =
                self.generate_content(Operation::Brief, request.model.id, &api_key, &body).await?;
            parse_brief_response(&response_text)
        })
    }

    fn generate_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let api_key = require_key(&request.model, request.credential.as_deref())?;
            let body = thumbnail_body(&request);
            tracing::debug!(model = request.model.id, "requesting thumbnail from Gemini");

            let response_text = self
                .generate_content(Operation::Thumbnail, request.model.id, &api_key, &body)
                .await?;
            parse_thumbnail_response(&response_text)
        })
    }
}

/// Every Gemini call is keyed, whatever the model's tier.
fn require_key(
    model: &crate::model::ModelDescriptor,
    credential: Option<&str>,
) -> Result<String, GenerationError> {
    match ensure_credential(model, credential)? {
        Some(key) => Ok(key.to_string()),
        None => Err(GenerationError::MissingCredential {
            model: model.id.to_string(),
            family: model.family.display_name().to_string(),
            env_var: model.family.env_var().to_string(),
        }),
    }
}

/// Response schema for the brief; every field is required.
fn brief_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "model": { "type": "STRING", "description": "The target video model, e.g., 'sora-2-pro' or 'veo-3'" },
            "duration": { "type": "NUMBER", "description": "Video duration in seconds." },
            "aspect_ratio": { "type": "STRING", "description": "Video aspect ratio." },
            "prompt": { "type": "STRING", "description": "The full, detailed cinematic prompt." },
            "sound": { "type": "STRING", "description": "Description of the sound design, music, and audio cues." },
            "style": { "type": "STRING", "description": "The visual style of the video." },
            "twist": { "type": "STRING", "description": "The surprising twist in the story." },
        },
        "required": ["model", "duration", "aspect_ratio", "prompt", "sound", "style", "twist"],
    })
}

pub(crate) fn brief_body(request: &BriefRequest) -> Value {
    let image = usable_reference_image(request);

    let mut parts = Vec::new();
    if let Some(image) = image {
        parts.push(json!({
            "inlineData": { "mimeType": image.mime_type, "data": image.to_base64() }
        }));
    }
    parts.push(json!({ "text": user_prompt(&request.topic, image.is_some()) }));

    json!({
        "systemInstruction": {
            "parts": [{ "text": system_instruction(request.settings, OutputContract::Schema) }]
        },
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": brief_schema(),
        },
    })
}

pub(crate) fn thumbnail_body(request: &ThumbnailRequest) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": thumbnail_prompt(&request.narrative_prompt) }]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"],
            "imageConfig": { "aspectRatio": request.aspect_ratio.as_str() },
        },
    })
}

pub(crate) fn parse_brief_response(body: &str) -> Result<GeneratedBrief, GenerationError> {
    let parsed: GeminiResponse = parse_body(Operation::Brief, body)?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    parse_brief_content(Some(&text))
}

pub(crate) fn parse_thumbnail_response(body: &str) -> Result<ThumbnailResult, GenerationError> {
    let parsed: GeminiResponse = parse_body(Operation::Thumbnail, body)?;
    parsed
        .candidates
        .into_iter()
        .flat_map(|c| c.content.parts)
        .find_map(|p| p.inline_data)
        .filter(|inline| !inline.data.is_empty())
        .map(|inline| ThumbnailResult::from_base64(&inline.mime_type, &inline.data))
        .ok_or(GenerationError::NoImage)
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}
