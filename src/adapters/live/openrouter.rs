//! Live adapter for the `OpenRouter` gateway (chat completions and image generations).

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    api_error, ensure_credential, parse_body, parse_brief_content, usable_reference_image,
};
use crate::config::SiteConfig;
use crate::error::{GenerationError, Operation};
use crate::params::ImageShape;
use crate::ports::provider::{
    BriefFuture, BriefRequest, GeneratedBrief, GenerationProvider, ThumbnailFuture,
    ThumbnailRequest, ThumbnailResult,
};
use crate::prompt::{system_instruction, thumbnail_prompt, user_prompt, OutputContract};

/// Default `OpenRouter` API base URL.
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Live provider for models served through `OpenRouter`.
pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
    site: SiteConfig,
}

impl OpenRouterProvider {
    /// Create a provider against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, site: SiteConfig) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url, site }
    }

    fn post(&self, path: &str, credential: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .header("HTTP-Referer", &self.site.url)
            .header("X-Title", &self.site.name);
        match credential {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

impl GenerationProvider for OpenRouterProvider {
    fn generate_brief(&self, request: &BriefRequest) -> BriefFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let credential = ensure_credential(&request.model, request.credential.as_deref())?;
            let body = brief_body(&request);
            tracing::debug!(model = request.model.id, "requesting brief from OpenRouter");

            let response = self.post("chat/completions", credential).json(&body).send().await?;
            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(api_error(Operation::Brief, status, &response_text));
            }
            parse_brief_response(&response_text)
        })
    }

    fn generate_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let credential = ensure_credential(&request.model, request.credential.as_deref())?;
            let body = thumbnail_body(&request)?;
            tracing::debug!(model = request.model.id, "requesting thumbnail from OpenRouter");

            let response = self.post("images/generations", credential).json(&body).send().await?;
            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(api_error(Operation::Thumbnail, status, &response_text));
            }
            parse_thumbnail_response(&response_text)
        })
    }
}

/// Build the chat-completions payload for a brief.
pub(crate) fn brief_body(request: &BriefRequest) -> Value {
    let image = usable_reference_image(request);

    let text = user_prompt(&request.topic, image.is_some());
    let user_content = match image {
        Some(image) => json!([
            { "type": "text", "text": text },
            { "type": "image_url", "image_url": { "url": image.to_data_uri() } },
        ]),
        None => Value::String(text),
    };

    json!({
        "model": request.model.id,
        "messages": [
            { "role": "system", "content": system_instruction(request.settings, OutputContract::Inline) },
            { "role": "user", "content": user_content },
        ],
        "response_format": { "type": "json_object" },
    })
}

/// Build the image-generations payload, shaped per model.
pub(crate) fn thumbnail_body(request: &ThumbnailRequest) -> Result<Value, GenerationError> {
    let shape = request.model.image_shape.ok_or_else(|| {
        GenerationError::InvalidArgument(format!("'{}' is not an image model", request.model.id))
    })?;

    let mut body = json!({
        "model": request.model.id,
        "prompt": thumbnail_prompt(&request.narrative_prompt),
    });

    match shape {
        ImageShape::SizeString => {
            body["n"] = json!(1);
            body["response_format"] = json!("b64_json");
            body["size"] = json!(request.aspect_ratio.openai_size());
        }
        ImageShape::AspectRatioField => {
            body["n"] = json!(1);
            body["response_format"] = json!("b64_json");
            body["aspect_ratio"] = json!(request.aspect_ratio.as_str());
        }
        ImageShape::Dimensions => {
            let (width, height) = request.aspect_ratio.pixel_dimensions();
            body["width"] = json!(width);
            body["height"] = json!(height);
        }
    }
    Ok(body)
}

pub(crate) fn parse_brief_response(body: &str) -> Result<GeneratedBrief, GenerationError> {
    let parsed: ChatResponse = parse_body(Operation::Brief, body)?;
    let content = parsed.choices.first().and_then(|c| c.message.content.as_deref());
    parse_brief_content(content)
}

pub(crate) fn parse_thumbnail_response(body: &str) -> Result<ThumbnailResult, GenerationError> {
    let parsed: ImagesResponse = parse_body(Operation::Thumbnail, body)?;
    let Some(first) = parsed.data.into_iter().next() else {
        return Err(GenerationError::NoImage);
    };

    match (first.b64_json, first.url) {
        (Some(b64), _) if !b64.is_empty() => Ok(ThumbnailResult::from_base64("image/png", &b64)),
        (_, Some(url)) if !url.is_empty() => Ok(ThumbnailResult { image_uri: url }),
        _ => Err(GenerationError::NoImage),
    }
}

// --- OpenRouter API response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}
