//! Generation provider port: one brief call and one thumbnail call per cycle.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::model::{ModelDescriptor, ProviderFamily};
use crate::params::AspectRatio;

/// Target video parameters injected into the brief instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Video length in seconds.
    pub duration_seconds: u32,
    /// Video aspect ratio.
    pub aspect_ratio: AspectRatio,
}

/// A user-supplied image used as visual inspiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// Raw image bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

impl ReferenceImage {
    /// Base64 of the raw bytes.
    #[must_use]
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// The image as a `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Per-family credentials. Never printed.
#[derive(Clone, Default)]
pub struct Credentials {
    /// `OpenRouter` bearer token.
    pub openrouter: Option<String>,
    /// Gemini API key.
    pub gemini: Option<String>,
}

impl Credentials {
    /// The credential for a provider family, if configured and non-empty.
    #[must_use]
    pub fn for_family(&self, family: ProviderFamily) -> Option<&str> {
        let key = match family {
            ProviderFamily::OpenRouter => self.openrouter.as_deref(),
            ProviderFamily::Gemini => self.gemini.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openrouter", &state(&self.openrouter))
            .field("gemini", &state(&self.gemini))
            .finish()
    }
}

/// A request to produce a director's brief.
#[derive(Debug, Clone, Serialize)]
pub struct BriefRequest {
    /// The text model to call.
    pub model: ModelDescriptor,
    /// Credential for the model's family.
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    /// Target video parameters.
    pub settings: GenerationSettings,
    /// The user's topic (or the previous narrative when remixing).
    pub topic: String,
    /// Optional visual inspiration.
    pub reference_image: Option<ReferenceImage>,
}

/// A request to render a thumbnail for a brief.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailRequest {
    /// The image model to call.
    pub model: ModelDescriptor,
    /// Credential for the model's family.
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    /// The brief's narrative prompt, embedded verbatim.
    pub narrative_prompt: String,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
}

/// The structured narrative produced by the text model.
///
/// Field names on the wire follow the JSON schema the model is asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBrief {
    /// Target text-to-video model, e.g. `"sora-2-pro"`.
    #[serde(rename = "model")]
    pub target_model_name: String,
    /// Video duration in seconds.
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    /// Video aspect ratio.
    pub aspect_ratio: String,
    /// The full cinematic prompt. Never empty.
    #[serde(rename = "prompt")]
    pub narrative_prompt: String,
    /// Sound design, music and audio cues.
    #[serde(rename = "sound")]
    pub sound_design: String,
    /// Visual style.
    #[serde(rename = "style")]
    pub visual_style: String,
    /// The surprising twist.
    pub twist: String,
}

/// A rendered thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailResult {
    /// A `data:` URI with base64 bytes, or a hosted URL.
    pub image_uri: String,
}

impl ThumbnailResult {
    /// Wrap inline base64 bytes as a `data:` URI.
    #[must_use]
    pub fn from_base64(mime_type: &str, b64: &str) -> Self {
        Self { image_uri: format!("data:{mime_type};base64,{b64}") }
    }

    /// Whether the image is embedded rather than hosted.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.image_uri.starts_with("data:")
    }
}

/// Boxed future type returned by [`GenerationProvider::generate_brief`].
pub type BriefFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedBrief, GenerationError>> + Send + 'a>>;

/// Boxed future type returned by [`GenerationProvider::generate_thumbnail`].
pub type ThumbnailFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ThumbnailResult, GenerationError>> + Send + 'a>>;

/// One backend family's brief and thumbnail calls.
pub trait GenerationProvider: Send + Sync {
    /// Produce a director's brief.
    fn generate_brief(&self, request: &BriefRequest) -> BriefFuture<'_>;

    /// Render a thumbnail for a narrative prompt.
    fn generate_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
