//! Service context that bundles one provider per family.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiProvider;
use crate::adapters::live::openrouter::OpenRouterProvider;
use crate::adapters::recording::provider::RecordingProvider;
use crate::adapters::replaying::provider::ReplayingProvider;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::error::GenerationError;
use crate::model::ProviderFamily;
use crate::ports::GenerationProvider;

/// Bundles the provider adapters the orchestrator routes between.
pub struct ServiceContext {
    openrouter: Box<dyn GenerationProvider>,
    gemini: Box<dyn GenerationProvider>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if adapters still hold the recorder or the file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, GenerationError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| GenerationError::Config("Recording adapter still has references".into()))?
            .into_inner()
            .map_err(|e| GenerationError::Config(format!("Recorder lock poisoned: {e}")))?;
        recorder.finish()
    }
}

impl ServiceContext {
    /// Build a context from explicit providers.
    #[must_use]
    pub fn from_providers(
        openrouter: Box<dyn GenerationProvider>,
        gemini: Box<dyn GenerationProvider>,
    ) -> Self {
        Self { openrouter, gemini }
    }

    /// The adapter serving a family.
    #[must_use]
    pub fn provider(&self, family: ProviderFamily) -> &dyn GenerationProvider {
        match family {
            ProviderFamily::OpenRouter => self.openrouter.as_ref(),
            ProviderFamily::Gemini => self.gemini.as_ref(),
        }
    }

    /// Live HTTP adapters for both families.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        Self::from_providers(
            Box::new(OpenRouterProvider::new(
                config.endpoints.openrouter.clone(),
                config.site.clone(),
            )),
            Box::new(GeminiProvider::new(config.endpoints.gemini.clone())),
        )
    }

    /// Live adapters wrapped so every call lands in one cassette.
    #[must_use]
    pub fn recording(config: &Config) -> (Self, RecordingSession) {
        let live = Self::live(config);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".promptreel/cassettes")
            .join(&timestamp)
            .join("provider.cassette.yaml");
        let recorder =
            CassetteRecorder::new(path, format!("{timestamp}-provider"), get_commit_hash());
        tracing::debug!(cassette = %recorder.path().display(), "recording provider calls");
        let recorder = Arc::new(Mutex::new(recorder));

        let ctx = Self::from_providers(
            Box::new(RecordingProvider::new(live.openrouter, Arc::clone(&recorder))),
            Box::new(RecordingProvider::new(live.gemini, Arc::clone(&recorder))),
        );
        (ctx, RecordingSession { recorder })
    }

    /// Serve both families from a single cassette, in recorded order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, GenerationError> {
        let replayer = Arc::new(Mutex::new(CassetteReplayer::from_file(path)?));
        Ok(Self::from_providers(
            Box::new(ReplayingProvider::new(Arc::clone(&replayer))),
            Box::new(ReplayingProvider::new(replayer)),
        ))
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
