//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::live::gemini::GEMINI_API_BASE;
use crate::adapters::live::openrouter::OPENROUTER_API_BASE;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Attribution sent to the gateway with every request.
    #[serde(default)]
    pub site: SiteConfig,

    /// Provider base URLs.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// API key configuration.
#[derive(Default, Deserialize)]
pub struct KeysConfig {
    /// `OpenRouter` API key.
    pub openrouter: Option<String>,
    /// Gemini API key.
    pub gemini: Option<String>,
}

impl std::fmt::Debug for KeysConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeysConfig")
            .field("openrouter", &self.openrouter.as_ref().map(|_| "<set>"))
            .field("gemini", &self.gemini.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// `HTTP-Referer` / `X-Title` attribution for the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Referring site URL.
    pub url: String,
    /// Site name.
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/promptreel/promptreel".to_string(),
            name: "AI Viral Video Prompt Builder".to_string(),
        }
    }
}

/// Provider base URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// `OpenRouter` API base (`.../api/v1`).
    pub openrouter: String,
    /// Gemini models endpoint (`.../v1beta/models`).
    pub gemini: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self { openrouter: OPENROUTER_API_BASE.to_string(), gemini: GEMINI_API_BASE.to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the `OpenRouter` API key, preferring environment variable.
    #[must_use]
    pub fn openrouter_key(&self) -> Option<String> {
        env_key("OPENROUTER_API_KEY").or_else(|| self.keys.openrouter.clone())
    }

    /// Get the Gemini API key, preferring environment variable.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        env_key("GEMINI_API_KEY").or_else(|| self.keys.gemini.clone())
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PROMPTREEL_CONFIG` environment variable
/// 3. `~/.config/promptreel/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PROMPTREEL_CONFIG") {
        return PathBuf::from(p);
    }

    config_dir().join("config.toml")
}

/// Discover the preference store path: `PROMPTREEL_STATE`, else
/// `~/.config/promptreel/state.json`.
#[must_use]
pub fn discover_state_path() -> PathBuf {
    std::env::var("PROMPTREEL_STATE").map_or_else(|_| config_dir().join("state.json"), PathBuf::from)
}

fn config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/promptreel")
    } else {
        PathBuf::from(".promptreel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.openrouter.is_none());
        assert!(config.keys.gemini.is_none());
        assert_eq!(config.site.name, "AI Viral Video Prompt Builder");
        assert_eq!(config.endpoints.openrouter, "https://openrouter.ai/api/v1");
        assert_eq!(
            config.endpoints.gemini,
            "https://generativelanguage.googleapis.com/v1beta/models"
        );
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.endpoints.openrouter, OPENROUTER_API_BASE);
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("promptreel_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
openrouter = "test-openrouter-key"
gemini = "test-gemini-key"

[site]
url = "https://example.test"

[endpoints]
openrouter = "http://localhost:8080/api/v1"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.openrouter.as_deref(), Some("test-openrouter-key"));
        assert_eq!(config.keys.gemini.as_deref(), Some("test-gemini-key"));
        assert_eq!(config.site.url, "https://example.test");
        assert_eq!(config.site.name, "AI Viral Video Prompt Builder");
        assert_eq!(config.endpoints.openrouter, "http://localhost:8080/api/v1");
        assert_eq!(config.endpoints.gemini, GEMINI_API_BASE);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("promptreel_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn keys_debug_is_masked() {
        let config = Config {
            keys: KeysConfig { openrouter: Some("sk-secret".into()), gemini: None },
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
