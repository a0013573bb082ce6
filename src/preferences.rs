//! Persisted user preferences and their default merge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;
use crate::model::{
    default_image_model, default_text_model, find_image_model, find_text_model, ModelDescriptor,
};
use crate::params::{validate_duration, AspectRatio, DEFAULT_DURATION};
use crate::ports::{GenerationSettings, KeyValueStore};

/// Store key for the persisted `OpenRouter` credential.
pub const API_KEY: &str = "openrouter_api_key";
/// Store key for the preferred text model id.
pub const TEXT_MODEL: &str = "preferred_text_model";
/// Store key for the preferred image model id.
pub const IMAGE_MODEL: &str = "preferred_image_model";
/// Store key for the serialized [`AppSettings`].
pub const SETTINGS: &str = "prompt_builder_settings";

/// Visual theme. Persisted, no effect on terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => f.write_str("dark"),
            Self::Light => f.write_str("light"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("Unsupported theme '{other}'. Valid: dark, light")),
        }
    }
}

/// The `prompt_builder_settings` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    /// Video duration in seconds.
    pub duration: u32,
    /// Visual theme.
    pub theme: Theme,
    /// Video aspect ratio.
    pub ratio: AspectRatio,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self { duration: DEFAULT_DURATION, theme: Theme::Dark, ratio: AspectRatio::Landscape }
    }
}

impl AppSettings {
    /// Overlay a stored record onto the defaults, one field at a time.
    ///
    /// Fields that are missing or invalid keep their default; the rest of the
    /// record still applies.
    #[must_use]
    pub fn merge_stored(raw: Option<&str>) -> Self {
        let mut settings = Self::default();
        let Some(raw) = raw else {
            return settings;
        };
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            tracing::warn!("stored settings unreadable, using defaults");
            return settings;
        };

        if let Some(duration) = map
            .get("duration")
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| validate_duration(*d).is_ok())
        {
            settings.duration = duration;
        }
        if let Some(theme) = map.get("theme").and_then(Value::as_str).and_then(|t| t.parse().ok()) {
            settings.theme = theme;
        }
        if let Some(ratio) = map.get("ratio").and_then(Value::as_str).and_then(|r| r.parse().ok()) {
            settings.ratio = ratio;
        }
        settings
    }

    /// The parameters a generation cycle needs.
    #[must_use]
    pub fn generation_settings(self) -> GenerationSettings {
        GenerationSettings { duration_seconds: self.duration, aspect_ratio: self.ratio }
    }
}

/// Everything restored from the store at startup.
#[derive(Clone)]
pub struct Preferences {
    /// Persisted `OpenRouter` credential.
    pub api_key: Option<String>,
    /// Preferred text model.
    pub text_model: &'static ModelDescriptor,
    /// Preferred image model.
    pub image_model: &'static ModelDescriptor,
    /// Duration, theme and ratio.
    pub settings: AppSettings,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("api_key", &self.api_key.as_deref().map(mask_secret))
            .field("text_model", &self.text_model.id)
            .field("image_model", &self.image_model.id)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Preferences {
    /// Restore preferences, replacing anything invalid with defaults.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let text_model = store
            .get(TEXT_MODEL)
            .and_then(|id| {
                let found = find_text_model(&id);
                if found.is_none() {
                    tracing::warn!(model = %id, "stored text model not in catalog, using default");
                }
                found
            })
            .unwrap_or_else(default_text_model);

        let image_model = store
            .get(IMAGE_MODEL)
            .and_then(|id| {
                let found = find_image_model(&id);
                if found.is_none() {
                    tracing::warn!(model = %id, "stored image model not in catalog, using default");
                }
                found
            })
            .unwrap_or_else(default_image_model);

        Self {
            api_key: store.get(API_KEY).filter(|k| !k.trim().is_empty()),
            text_model,
            image_model,
            settings: AppSettings::merge_stored(store.get(SETTINGS).as_deref()),
        }
    }
}

/// Persist the `OpenRouter` credential.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_api_key(store: &mut dyn KeyValueStore, key: &str) -> Result<(), GenerationError> {
    store.set(API_KEY, key.trim())
}

/// Persist the preferred text model after checking the catalog.
///
/// # Errors
///
/// Returns an error for ids outside the catalog or if the store cannot be written.
pub fn save_text_model(store: &mut dyn KeyValueStore, id: &str) -> Result<(), GenerationError> {
    let model = find_text_model(id).ok_or_else(|| GenerationError::UnknownModel(id.to_string()))?;
    store.set(TEXT_MODEL, model.id)
}

/// Persist the preferred image model after checking the catalog.
///
/// # Errors
///
/// Returns an error for ids outside the catalog or if the store cannot be written.
pub fn save_image_model(store: &mut dyn KeyValueStore, id: &str) -> Result<(), GenerationError> {
    let model = find_image_model(id).ok_or_else(|| GenerationError::UnknownModel(id.to_string()))?;
    store.set(IMAGE_MODEL, model.id)
}

/// Persist the settings record.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_settings(
    store: &mut dyn KeyValueStore,
    settings: AppSettings,
) -> Result<(), GenerationError> {
    let json = serde_json::to_string(&settings)
        .map_err(|e| GenerationError::Config(format!("Failed to encode settings: {e}")))?;
    store.set(SETTINGS, &json)
}

/// Show only the ends of a secret.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
