//! The generation cycle: validate, brief, thumbnail.
//!
//! One cycle runs at a time. The session lock is only taken between awaits,
//! so a caller polling [`Orchestrator::snapshot`] always sees a consistent
//! state while a provider call is in flight.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::context::ServiceContext;
use crate::error::GenerationError;
use crate::model::{find_image_model, find_text_model, ModelDescriptor};
use crate::ports::{
    BriefRequest, Credentials, GeneratedBrief, GenerationSettings, ReferenceImage,
    ThumbnailRequest, ThumbnailResult,
};

/// Where the current cycle is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleState {
    /// Nothing has run yet.
    #[default]
    Idle,
    /// Checking preconditions; no outbound call yet.
    Validating,
    /// Waiting on the text model.
    GeneratingBrief,
    /// Waiting on the image model.
    GeneratingThumbnail,
    /// Brief and thumbnail both available.
    Complete,
    /// The cycle stopped with an error message.
    Errored,
}

impl CycleState {
    /// Whether a cycle is in progress.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::GeneratingBrief | Self::GeneratingThumbnail)
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Current cycle state.
    pub state: CycleState,
    /// Latest brief, if any.
    pub brief: Option<GeneratedBrief>,
    /// Latest thumbnail, if any.
    pub thumbnail: Option<ThumbnailResult>,
    /// Error from the last cycle, until dismissed.
    pub error: Option<String>,
    /// Set when the last failure looks like a credential problem.
    pub credential_prompt: bool,
}

impl Session {
    fn fail(&mut self, error: &GenerationError) {
        tracing::debug!(state = ?self.state, "generation cycle failed");
        self.state = CycleState::Errored;
        self.error = Some(error.to_string());
        self.credential_prompt = error.is_credential_problem();
    }
}

/// One user action's inputs.
#[derive(Debug, Clone)]
pub struct CycleInput {
    /// Topic text; ignored when remixing.
    pub topic: String,
    /// Optional visual inspiration.
    pub reference_image: Option<ReferenceImage>,
    /// Duration and aspect ratio.
    pub settings: GenerationSettings,
    /// Text model id.
    pub text_model: String,
    /// Image model id.
    pub image_model: String,
    /// Per-family credentials.
    pub credentials: Credentials,
}

/// How a call to [`Orchestrator::generate`] or [`Orchestrator::remix`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Brief and thumbnail produced.
    Complete,
    /// The session now holds an error.
    Errored,
    /// Another cycle was running, or there was nothing to remix.
    Ignored,
}

/// Validated plan for one cycle.
struct Plan {
    brief: BriefRequest,
    image_model: &'static ModelDescriptor,
    image_credential: Option<String>,
}

/// Drives generation cycles against the providers in a [`ServiceContext`].
pub struct Orchestrator {
    context: ServiceContext,
    session: Mutex<Session>,
}

impl Orchestrator {
    /// Create an orchestrator in the `Idle` state.
    #[must_use]
    pub fn new(context: ServiceContext) -> Self {
        Self { context, session: Mutex::new(Session::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Clear the error message. Results are left alone.
    ///
    /// The CLI exits after printing an error, so only interactive front ends
    /// call this.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn dismiss_error(&self) {
        let mut session = self.lock();
        session.error = None;
        session.credential_prompt = false;
        if session.state == CycleState::Errored {
            session.state = CycleState::Idle;
        }
    }

    /// Load a previously saved brief so it can be remixed.
    ///
    /// Returns `false` while a cycle is running.
    pub fn restore_brief(&self, brief: GeneratedBrief) -> bool {
        let mut session = self.lock();
        if session.state.is_busy() {
            return false;
        }
        session.brief = Some(brief);
        session.thumbnail = None;
        true
    }

    /// Run a fresh cycle for `input.topic`.
    pub async fn generate(&self, input: CycleInput) -> CycleOutcome {
        self.run(input, false).await
    }

    /// Run a cycle whose topic is the current brief's narrative prompt.
    pub async fn remix(&self, input: CycleInput) -> CycleOutcome {
        self.run(input, true).await
    }

    async fn run(&self, input: CycleInput, remix: bool) -> CycleOutcome {
        let topic = {
            let mut session = self.lock();
            if session.state.is_busy() {
                tracing::debug!(state = ?session.state, "cycle already running, ignoring");
                return CycleOutcome::Ignored;
            }
            let topic = if remix {
                let Some(brief) = &session.brief else {
                    tracing::debug!("nothing to remix, ignoring");
                    return CycleOutcome::Ignored;
                };
                brief.narrative_prompt.clone()
            } else {
                input.topic.trim().to_string()
            };
            session.state = CycleState::Validating;
            topic
        };

        let plan = match validate(input, topic) {
            Ok(plan) => plan,
            Err(e) => {
                self.lock().fail(&e);
                return CycleOutcome::Errored;
            }
        };

        {
            let mut session = self.lock();
            session.brief = None;
            session.thumbnail = None;
            session.error = None;
            session.credential_prompt = false;
            session.state = CycleState::GeneratingBrief;
        }

        let text_model = plan.brief.model;
        tracing::debug!(
            model = text_model.id,
            family = text_model.family.display_name(),
            remix,
            "generating brief"
        );
        let brief = match self.context.provider(text_model.family).generate_brief(&plan.brief).await
        {
            Ok(brief) => brief,
            Err(e) => {
                self.lock().fail(&e);
                return CycleOutcome::Errored;
            }
        };

        let thumbnail_request = ThumbnailRequest {
            model: *plan.image_model,
            credential: plan.image_credential,
            narrative_prompt: brief.narrative_prompt.clone(),
            aspect_ratio: plan.brief.settings.aspect_ratio,
        };
        {
            let mut session = self.lock();
            session.brief = Some(brief);
            session.state = CycleState::GeneratingThumbnail;
        }

        tracing::debug!(
            model = plan.image_model.id,
            family = plan.image_model.family.display_name(),
            "generating thumbnail"
        );
        let result = self
            .context
            .provider(plan.image_model.family)
            .generate_thumbnail(&thumbnail_request)
            .await;

        let mut session = self.lock();
        match result {
            Ok(thumbnail) => {
                session.thumbnail = Some(thumbnail);
                session.state = CycleState::Complete;
                CycleOutcome::Complete
            }
            Err(e) => {
                session.fail(&e);
                CycleOutcome::Errored
            }
        }
    }
}

/// Check preconditions; nothing here touches the network.
fn validate(input: CycleInput, topic: String) -> Result<Plan, GenerationError> {
    if topic.is_empty() {
        return Err(GenerationError::MissingTopic);
    }
    let text_model = find_text_model(&input.text_model)
        .ok_or_else(|| GenerationError::UnknownModel(input.text_model.clone()))?;
    let image_model = find_image_model(&input.image_model)
        .ok_or_else(|| GenerationError::UnknownModel(input.image_model.clone()))?;

    let text_credential = credential_for(text_model, &input.credentials)?;
    let image_credential = credential_for(image_model, &input.credentials)?;

    Ok(Plan {
        brief: BriefRequest {
            model: *text_model,
            credential: text_credential,
            settings: input.settings,
            topic,
            reference_image: input.reference_image,
        },
        image_model,
        image_credential,
    })
}

fn credential_for(
    model: &ModelDescriptor,
    credentials: &Credentials,
) -> Result<Option<String>, GenerationError> {
    let credential = credentials.for_family(model.family).map(str::to_string);
    if credential.is_none() && model.requires_credential() {
        return Err(GenerationError::MissingCredential {
            model: model.id.to_string(),
            family: model.family.display_name().to_string(),
            env_var: model.family.env_var().to_string(),
        });
    }
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::error::Operation;
    use crate::params::AspectRatio;
    use crate::ports::provider::{BriefFuture, GenerationProvider, ThumbnailFuture};

    /// Serves queued results and counts calls.
    #[derive(Default)]
    struct ScriptedProvider {
        briefs: Mutex<VecDeque<Result<GeneratedBrief, GenerationError>>>,
        thumbnails: Mutex<VecDeque<Result<ThumbnailResult, GenerationError>>>,
        brief_calls: AtomicUsize,
        thumbnail_calls: AtomicUsize,
        topics: Mutex<Vec<String>>,
        narratives: Mutex<Vec<String>>,
        gate: Option<Notify>,
    }

    impl ScriptedProvider {
        fn push_brief(&self, result: Result<GeneratedBrief, GenerationError>) {
            self.briefs.lock().unwrap().push_back(result);
        }

        fn push_thumbnail(&self, result: Result<ThumbnailResult, GenerationError>) {
            self.thumbnails.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> (usize, usize) {
            (self.brief_calls.load(Ordering::SeqCst), self.thumbnail_calls.load(Ordering::SeqCst))
        }
    }

    impl GenerationProvider for Arc<ScriptedProvider> {
        fn generate_brief(&self, request: &BriefRequest) -> BriefFuture<'_> {
            self.brief_calls.fetch_add(1, Ordering::SeqCst);
            self.topics.lock().unwrap().push(request.topic.clone());
            Box::pin(async move {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                self.briefs.lock().unwrap().pop_front().unwrap_or(Err(GenerationError::NoImage))
            })
        }

        fn generate_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailFuture<'_> {
            self.thumbnail_calls.fetch_add(1, Ordering::SeqCst);
            self.narratives.lock().unwrap().push(request.narrative_prompt.clone());
            Box::pin(async move {
                self.thumbnails.lock().unwrap().pop_front().unwrap_or(Err(GenerationError::NoImage))
            })
        }
    }

    fn brief(prompt: &str) -> GeneratedBrief {
        GeneratedBrief {
            target_model_name: "sora-2-pro".into(),
            duration_seconds: 8.0,
            aspect_ratio: "16:9".into(),
            narrative_prompt: prompt.into(),
            sound_design: "Deep bass".into(),
            visual_style: "Neon noir".into(),
            twist: "The crowd is all raccoons".into(),
        }
    }

    fn thumbnail() -> ThumbnailResult {
        ThumbnailResult::from_base64("image/png", "AAAA")
    }

    fn input(topic: &str) -> CycleInput {
        CycleInput {
            topic: topic.into(),
            reference_image: None,
            settings: GenerationSettings { duration_seconds: 8, aspect_ratio: AspectRatio::Landscape },
            text_model: "meta-llama/llama-4-maverick:free".into(),
            image_model: "black-forest-labs/flux-1.1-schnell".into(),
            credentials: Credentials::default(),
        }
    }

    fn orchestrator(
        openrouter: &Arc<ScriptedProvider>,
        gemini: &Arc<ScriptedProvider>,
    ) -> Orchestrator {
        Orchestrator::new(ServiceContext::from_providers(
            Box::new(Arc::clone(openrouter)),
            Box::new(Arc::clone(gemini)),
        ))
    }

    fn single() -> (Arc<ScriptedProvider>, Orchestrator) {
        let provider = Arc::new(ScriptedProvider::default());
        let unused = Arc::new(ScriptedProvider::default());
        let orchestrator = orchestrator(&provider, &unused);
        (provider, orchestrator)
    }

    #[tokio::test]
    async fn happy_path_completes() {
        let (provider, orchestrator) = single();
        provider.push_brief(Ok(brief("A raccoon DJ drops the beat")));
        provider.push_thumbnail(Ok(thumbnail()));

        let outcome = orchestrator.generate(input("A raccoon DJ wearing neon glasses")).await;

        assert_eq!(outcome, CycleOutcome::Complete);
        let session = orchestrator.snapshot();
        assert_eq!(session.state, CycleState::Complete);
        assert_eq!(session.brief, Some(brief("A raccoon DJ drops the beat")));
        assert!(session.thumbnail.unwrap().image_uri.starts_with("data:image/png;base64,"));
        assert!(session.error.is_none());
        assert_eq!(provider.calls(), (1, 1));
        assert_eq!(provider.topics.lock().unwrap()[0], "A raccoon DJ wearing neon glasses");
        assert_eq!(provider.narratives.lock().unwrap()[0], "A raccoon DJ drops the beat");
    }

    #[tokio::test]
    async fn paid_model_without_credential_fails_before_any_call() {
        let (provider, orchestrator) = single();
        let mut request = input("A raccoon DJ");
        request.image_model = "openai/dall-e-3".into();

        let outcome = orchestrator.generate(request).await;

        assert_eq!(outcome, CycleOutcome::Errored);
        let session = orchestrator.snapshot();
        assert_eq!(session.state, CycleState::Errored);
        assert!(session.error.unwrap().contains("API key is required for openai/dall-e-3"));
        assert!(session.credential_prompt);
        assert_eq!(provider.calls(), (0, 0));
    }

    #[tokio::test]
    async fn thumbnail_rate_limit_keeps_brief() {
        let (provider, orchestrator) = single();
        provider.push_brief(Ok(brief("A raccoon DJ drops the beat")));
        provider.push_thumbnail(Err(GenerationError::Api {
            operation: Operation::Thumbnail,
            status: 429,
            message: "Rate limit exceeded".into(),
        }));

        let outcome = orchestrator.generate(input("A raccoon DJ")).await;

        assert_eq!(outcome, CycleOutcome::Errored);
        let session = orchestrator.snapshot();
        assert_eq!(session.state, CycleState::Errored);
        assert_eq!(session.brief, Some(brief("A raccoon DJ drops the beat")));
        assert!(session.thumbnail.is_none());
        assert_eq!(
            session.error.as_deref(),
            Some("Failed to generate thumbnail. Status: 429: Rate limit exceeded")
        );
        assert!(!session.credential_prompt);
    }

    #[tokio::test]
    async fn second_cycle_ignored_while_generating_brief() {
        let provider = Arc::new(ScriptedProvider { gate: Some(Notify::new()), ..Default::default() });
        let unused = Arc::new(ScriptedProvider::default());
        let orchestrator = orchestrator(&provider, &unused);
        provider.push_brief(Ok(brief("First")));
        provider.push_thumbnail(Ok(thumbnail()));

        let first = orchestrator.generate(input("first topic"));
        let second = async {
            tokio::task::yield_now().await;
            let state = orchestrator.snapshot().state;
            let outcome = orchestrator.generate(input("second topic")).await;
            if let Some(gate) = &provider.gate {
                gate.notify_one();
            }
            (state, outcome)
        };
        let (first_outcome, (observed, second_outcome)) = tokio::join!(first, second);

        assert_eq!(observed, CycleState::GeneratingBrief);
        assert_eq!(second_outcome, CycleOutcome::Ignored);
        assert_eq!(first_outcome, CycleOutcome::Complete);
        assert_eq!(provider.calls(), (1, 1));
        assert_eq!(provider.topics.lock().unwrap().as_slice(), ["first topic"]);
    }

    #[tokio::test]
    async fn remix_uses_prior_narrative_and_clears_thumbnail() {
        let (provider, orchestrator) = single();
        provider.push_brief(Ok(brief("A raccoon DJ drops the beat")));
        provider.push_thumbnail(Ok(thumbnail()));
        assert_eq!(orchestrator.generate(input("A raccoon DJ")).await, CycleOutcome::Complete);

        provider.push_brief(Err(GenerationError::Api {
            operation: Operation::Brief,
            status: 500,
            message: "Upstream error".into(),
        }));
        let outcome = orchestrator.remix(input("this topic is ignored")).await;

        assert_eq!(outcome, CycleOutcome::Errored);
        assert_eq!(provider.topics.lock().unwrap()[1], "A raccoon DJ drops the beat");
        let session = orchestrator.snapshot();
        assert!(session.thumbnail.is_none());
        assert!(session.brief.is_none());
        assert_eq!(
            session.error.as_deref(),
            Some("Failed to generate prompt. Status: 500: Upstream error")
        );
    }

    #[tokio::test]
    async fn remix_replaces_brief() {
        let (provider, orchestrator) = single();
        assert!(orchestrator.restore_brief(brief("Saved narrative")));
        provider.push_brief(Ok(brief("Remixed narrative")));
        provider.push_thumbnail(Ok(thumbnail()));

        assert_eq!(orchestrator.remix(input("")).await, CycleOutcome::Complete);
        assert_eq!(provider.topics.lock().unwrap()[0], "Saved narrative");
        assert_eq!(provider.narratives.lock().unwrap()[0], "Remixed narrative");
        assert_eq!(orchestrator.snapshot().brief, Some(brief("Remixed narrative")));
    }

    #[tokio::test]
    async fn remix_without_brief_is_ignored() {
        let (provider, orchestrator) = single();
        assert_eq!(orchestrator.remix(input("anything")).await, CycleOutcome::Ignored);
        assert_eq!(orchestrator.snapshot().state, CycleState::Idle);
        assert_eq!(provider.calls(), (0, 0));
    }

    #[tokio::test]
    async fn precondition_failure_keeps_prior_results() {
        let (provider, orchestrator) = single();
        provider.push_brief(Ok(brief("A raccoon DJ drops the beat")));
        provider.push_thumbnail(Ok(thumbnail()));
        orchestrator.generate(input("A raccoon DJ")).await;

        assert_eq!(orchestrator.generate(input("   ")).await, CycleOutcome::Errored);
        let session = orchestrator.snapshot();
        assert_eq!(session.error.as_deref(), Some("Please enter a topic or idea."));
        assert!(session.brief.is_some());
        assert!(session.thumbnail.is_some());

        let mut unknown = input("A raccoon DJ");
        unknown.text_model = "retired/model".into();
        assert_eq!(orchestrator.generate(unknown).await, CycleOutcome::Errored);
        assert!(orchestrator.snapshot().error.unwrap().contains("retired/model"));
        assert_eq!(provider.calls(), (1, 1));
    }

    #[tokio::test]
    async fn dismiss_error_is_idempotent() {
        let (provider, orchestrator) = single();
        provider.push_brief(Ok(brief("A raccoon DJ drops the beat")));
        provider.push_thumbnail(Err(GenerationError::NoImage));
        orchestrator.generate(input("A raccoon DJ")).await;
        assert!(orchestrator.snapshot().error.is_some());

        orchestrator.dismiss_error();
        let once = orchestrator.snapshot();
        orchestrator.dismiss_error();
        let twice = orchestrator.snapshot();

        assert!(once.error.is_none());
        assert_eq!(once.state, twice.state);
        assert_eq!(once.brief, twice.brief);
        assert!(twice.brief.is_some());
        assert!(twice.error.is_none());
    }

    #[tokio::test]
    async fn routes_by_family() {
        let openrouter = Arc::new(ScriptedProvider::default());
        let gemini = Arc::new(ScriptedProvider::default());
        let orchestrator = orchestrator(&openrouter, &gemini);
        gemini.push_brief(Ok(brief("Gemini narrative")));
        openrouter.push_thumbnail(Ok(ThumbnailResult { image_uri: "https://cdn.example/t.png".into() }));

        let mut request = input("Miniature worlds");
        request.text_model = "gemini-2.5-flash".into();
        request.credentials.gemini = Some("g-key".into());

        assert_eq!(orchestrator.generate(request).await, CycleOutcome::Complete);
        assert_eq!(gemini.calls(), (1, 0));
        assert_eq!(openrouter.calls(), (0, 1));
    }

    #[tokio::test]
    async fn unauthorized_brief_requests_credential() {
        let (provider, orchestrator) = single();
        provider.push_brief(Err(GenerationError::Api {
            operation: Operation::Brief,
            status: 401,
            message: "No auth credentials found".into(),
        }));

        assert_eq!(orchestrator.generate(input("A raccoon DJ")).await, CycleOutcome::Errored);
        let session = orchestrator.snapshot();
        assert!(session.credential_prompt);
        assert!(session.brief.is_none());
        assert_eq!(provider.calls(), (1, 0));
    }
}
