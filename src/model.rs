//! Static model catalog and provider-family routing data.

use serde::Serialize;

use crate::params::ImageShape;

/// Backend families, each with its own request/response contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// `OpenRouter` aggregator gateway (`OpenAI`-compatible endpoints).
    OpenRouter,
    /// Google Gemini API, called directly.
    Gemini,
}

impl ProviderFamily {
    /// Human-readable family name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenRouter => "OpenRouter",
            Self::Gemini => "Gemini",
        }
    }

    /// Environment variable that supplies this family's key.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Whether every call to this family must be authenticated, free tier or not.
    #[must_use]
    pub fn always_authenticated(self) -> bool {
        match self {
            Self::OpenRouter => false,
            Self::Gemini => true,
        }
    }
}

/// Pricing tier shown in the model pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    /// No charge.
    Free,
    /// Billed to the credential's account.
    Paid,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Model id sent to the provider.
    pub id: &'static str,
    /// Name shown to the user.
    pub display_name: &'static str,
    /// Which adapter serves this model.
    pub family: ProviderFamily,
    /// Pricing tier.
    pub cost_tier: CostTier,
    /// Whether the model accepts an inline reference image.
    pub accepts_image_input: bool,
    /// Image payload shape; `None` for text models.
    pub image_shape: Option<ImageShape>,
}

impl ModelDescriptor {
    const fn text(
        id: &'static str,
        display_name: &'static str,
        family: ProviderFamily,
        cost_tier: CostTier,
        accepts_image_input: bool,
    ) -> Self {
        Self { id, display_name, family, cost_tier, accepts_image_input, image_shape: None }
    }

    const fn image(
        id: &'static str,
        display_name: &'static str,
        family: ProviderFamily,
        cost_tier: CostTier,
        shape: ImageShape,
    ) -> Self {
        Self {
            id,
            display_name,
            family,
            cost_tier,
            accepts_image_input: false,
            image_shape: Some(shape),
        }
    }

    /// Whether a credential must be present before calling this model.
    #[must_use]
    pub fn requires_credential(&self) -> bool {
        self.cost_tier == CostTier::Paid || self.family.always_authenticated()
    }
}

use CostTier::{Free, Paid};
use ImageShape::{AspectRatioField, Dimensions, SizeString};
use ProviderFamily::{Gemini, OpenRouter};

/// Text models, free tier first. The first entry is the default.
pub static TEXT_MODELS: &[ModelDescriptor] = &[
    ModelDescriptor::text("meta-llama/llama-4-maverick:free", "Llama 4 Maverick", OpenRouter, Free, true),
    ModelDescriptor::text("google/gemini-2.5-pro-exp-03-25:free", "Gemini 2.5 Pro Exp", OpenRouter, Free, true),
    ModelDescriptor::text("meta-llama/llama-4-scout:free", "Llama 4 Scout", OpenRouter, Free, true),
    ModelDescriptor::text("mistralai/mistral-small-3.1-24b-instruct:free", "Mistral Small 3.1", OpenRouter, Free, true),
    ModelDescriptor::text("moonshot/kimi-vl-a3b-thinking:free", "Kimi VL A3B Thinking", OpenRouter, Free, true),
    ModelDescriptor::text("deepseek/deepseek-chat-v3.1:free", "DeepSeek Chat V3.1", OpenRouter, Free, false),
    ModelDescriptor::text("nvidia/llama-3.1-nemotron-nano-8b-v1:free", "Llama 3.1 Nemotron", OpenRouter, Free, false),
    ModelDescriptor::text("qwen/qwen2.5-vl-3b-instruct:free", "Qwen2.5 VL 3B Instruct", OpenRouter, Free, true),
    ModelDescriptor::text("gemini-2.5-flash", "Gemini 2.5 Flash (direct)", Gemini, Free, true),
    ModelDescriptor::text("google/gemini-2.0-flash-exp", "Gemini 2.0 Flash", OpenRouter, Paid, true),
    ModelDescriptor::text("openai/gpt-4o", "GPT-4o", OpenRouter, Paid, true),
    ModelDescriptor::text("anthropic/claude-3.5-sonnet", "Claude 3.5 Sonnet", OpenRouter, Paid, true),
    ModelDescriptor::text("anthropic/claude-3-haiku", "Claude 3 Haiku", OpenRouter, Paid, true),
    ModelDescriptor::text("openai/o1-preview", "o1 Preview", OpenRouter, Paid, false),
    ModelDescriptor::text("microsoft/wizardlm-2-8x22b", "WizardLM-2", OpenRouter, Paid, false),
    ModelDescriptor::text("meta-llama/llama-3.1-70b-instruct", "Llama 3.1 70B", OpenRouter, Paid, false),
    ModelDescriptor::text("google/gemini-2.0-flash-thinking-exp", "Gemini 2.0 Flash Thinking", OpenRouter, Paid, true),
    ModelDescriptor::text("nousresearch/hermes-3-llama-3.1-8b", "Hermes 3 8B", OpenRouter, Paid, false),
    ModelDescriptor::text("gemini-2.5-pro", "Gemini 2.5 Pro (direct)", Gemini, Paid, true),
];

/// Image models, free tier first. The first entry is the default.
pub static IMAGE_MODELS: &[ModelDescriptor] = &[
    ModelDescriptor::image("black-forest-labs/flux-1.1-schnell", "Flux 1.1 Schnell", OpenRouter, Free, Dimensions),
    ModelDescriptor::image("stability-ai/sdxl-1.0", "SDXL 1.0", OpenRouter, Free, Dimensions),
    ModelDescriptor::image("gemini-2.5-flash-image", "Gemini 2.5 Flash Image (direct)", Gemini, Free, AspectRatioField),
    ModelDescriptor::image("openai/dall-e-3", "DALL-E 3", OpenRouter, Paid, SizeString),
    ModelDescriptor::image("stability-ai/stable-image-ultra", "Stable Image Ultra", OpenRouter, Paid, AspectRatioField),
    ModelDescriptor::image("stability-ai/stable-diffusion-3.5", "Stable Diffusion 3.5", OpenRouter, Paid, Dimensions),
    ModelDescriptor::image("black-forest-labs/flux-1-dev", "FLUX.1 Dev", OpenRouter, Paid, Dimensions),
    ModelDescriptor::image("playground/playground-2.5", "Playground 2.5", OpenRouter, Paid, Dimensions),
    ModelDescriptor::image("ideogram/ideogram-1.0", "Ideogram 1.0", OpenRouter, Paid, Dimensions),
];

/// Look up a text model by exact id.
#[must_use]
pub fn find_text_model(id: &str) -> Option<&'static ModelDescriptor> {
    TEXT_MODELS.iter().find(|m| m.id == id)
}

/// Look up an image model by exact id.
#[must_use]
pub fn find_image_model(id: &str) -> Option<&'static ModelDescriptor> {
    IMAGE_MODELS.iter().find(|m| m.id == id)
}

/// Default text model (first catalog entry).
#[must_use]
pub fn default_text_model() -> &'static ModelDescriptor {
    &TEXT_MODELS[0]
}

/// Default image model (first catalog entry).
#[must_use]
pub fn default_image_model() -> &'static ModelDescriptor {
    &IMAGE_MODELS[0]
}

/// Trending topics offered as quick-fill suggestions.
pub const TREND_TOPICS: &[&str] = &[
    "Retro futurism",
    "Cottagecore aesthetic",
    "ASMR visuals",
    "Satisfying loops",
    "Miniature worlds",
    "Surreal animations",
    "Vintage tech revival",
];

/// Fill-in-the-blank templates offered as quick-fill suggestions.
pub const FILL_IN_BLANK_TEMPLATES: &[&str] = &[
    "[Animal] doing [Human Task] in [Weird Setting]",
    "[Celebrity] reacting to [Funny Event]",
    "[Occupation] in [Wrong Context]",
    "[Object] behaving like [Human Emotion]",
];

/// Append quick-fill keywords to a topic, comma separated.
#[must_use]
pub fn compose_topic(topic: Option<&str>, keywords: &[String]) -> String {
    topic
        .into_iter()
        .chain(keywords.iter().map(String::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_free_openrouter() {
        assert_eq!(default_text_model().id, "meta-llama/llama-4-maverick:free");
        assert_eq!(default_image_model().id, "black-forest-labs/flux-1.1-schnell");
        assert!(!default_text_model().requires_credential());
        assert!(!default_image_model().requires_credential());
    }

    #[test]
    fn paid_models_need_credentials() {
        assert!(find_image_model("openai/dall-e-3").unwrap().requires_credential());
        assert!(find_text_model("anthropic/claude-3.5-sonnet").unwrap().requires_credential());
    }

    #[test]
    fn direct_gemini_always_needs_a_key() {
        let model = find_text_model("gemini-2.5-flash").unwrap();
        assert_eq!(model.cost_tier, CostTier::Free);
        assert!(model.requires_credential());
    }

    #[test]
    fn image_models_carry_a_shape() {
        assert!(IMAGE_MODELS.iter().all(|m| m.image_shape.is_some()));
        assert!(TEXT_MODELS.iter().all(|m| m.image_shape.is_none()));
        assert_eq!(find_image_model("openai/dall-e-3").unwrap().image_shape, Some(SizeString));
    }

    #[test]
    fn ids_are_unique() {
        for catalog in [TEXT_MODELS, IMAGE_MODELS] {
            let mut ids: Vec<&str> = catalog.iter().map(|m| m.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), catalog.len());
        }
    }

    #[test]
    fn unknown_models() {
        assert!(find_text_model("openai/dall-e-3").is_none());
        assert!(find_image_model("not-a-model").is_none());
    }

    #[test]
    fn compose_topic_appends_keywords() {
        let keywords = vec!["Anime".to_string(), " Drone shots ".to_string()];
        assert_eq!(
            compose_topic(Some("A raccoon DJ"), &keywords),
            "A raccoon DJ, Anime, Drone shots"
        );
        assert_eq!(compose_topic(None, &keywords), "Anime, Drone shots");
        assert_eq!(compose_topic(Some("  "), &[]), "");
    }
}
