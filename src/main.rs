//! Promptreel - viral video prompt builder CLI.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod error_message;
mod model;
mod orchestrator;
mod output;
mod params;
mod ports;
mod preferences;
mod prompt;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::adapters::store::FileStore;
use crate::cli::{Cli, Command, CycleArgs, GenerateArgs, PrefsArgs, RemixArgs};
use crate::config::Config;
use crate::context::{RecordingSession, ServiceContext};
use crate::error::GenerationError;
use crate::model::{
    compose_topic, CostTier, ModelDescriptor, FILL_IN_BLANK_TEMPLATES, IMAGE_MODELS, TEXT_MODELS,
    TREND_TOPICS,
};
use crate::orchestrator::{CycleInput, Orchestrator, Session};
use crate::output::{
    load_brief, load_reference_image, save_brief, save_thumbnail, ThumbnailOutput,
};
use crate::ports::{Credentials, GeneratedBrief, KeyValueStore, ReferenceImage};
use crate::preferences::{mask_secret, Preferences};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "promptreel=debug" } else { "promptreel=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

async fn run(cli: Cli) -> Result<(), GenerationError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(GenerationError::Config)?;
    tracing::debug!(config = %config_path.display(), "configuration loaded");

    let mut store = FileStore::open(config::discover_state_path());
    tracing::debug!(store = %store.path().display(), "preferences opened");

    match cli.command {
        Command::Generate(args) => generate(&config, &store, args).await,
        Command::Remix(args) => remix(&config, &store, args).await,
        Command::Models => {
            print_models();
            Ok(())
        }
        Command::Ideas => {
            print_ideas();
            Ok(())
        }
        Command::Prefs(args) => update_prefs(&mut store, &args),
    }
}

async fn generate(
    config: &Config,
    store: &dyn KeyValueStore,
    args: GenerateArgs,
) -> Result<(), GenerationError> {
    let topic = compose_topic(args.topic.as_deref(), &args.keywords);
    let reference_image = args.image.as_deref().map(load_reference_image).transpose()?;
    let input = cycle_input(config, store, &args.cycle, topic.clone(), reference_image);

    let (ctx, recording) = open_context(config)?;
    let orchestrator = Orchestrator::new(ctx);
    let outcome = orchestrator.generate(input).await;
    tracing::debug!(?outcome, "cycle finished");

    let session = orchestrator.snapshot();
    drop(orchestrator);
    finish_recording(recording);

    report(&session, &args.cycle, &topic)
}

async fn remix(
    config: &Config,
    store: &dyn KeyValueStore,
    args: RemixArgs,
) -> Result<(), GenerationError> {
    let brief = load_brief(&args.brief)?;
    let topic = brief.narrative_prompt.clone();
    let input = cycle_input(config, store, &args.cycle, String::new(), None);

    let (ctx, recording) = open_context(config)?;
    let orchestrator = Orchestrator::new(ctx);
    orchestrator.restore_brief(brief);
    let outcome = orchestrator.remix(input).await;
    tracing::debug!(?outcome, "remix finished");

    let session = orchestrator.snapshot();
    drop(orchestrator);
    finish_recording(recording);

    report(&session, &args.cycle, &topic)
}

/// Merge flags over saved preferences and resolve credentials.
fn cycle_input(
    config: &Config,
    store: &dyn KeyValueStore,
    args: &CycleArgs,
    topic: String,
    reference_image: Option<ReferenceImage>,
) -> CycleInput {
    let prefs = Preferences::load(store);
    let mut settings = prefs.settings.generation_settings();
    if let Some(duration) = args.duration {
        settings.duration_seconds = duration;
    }
    if let Some(ratio) = args.ratio {
        settings.aspect_ratio = ratio;
    }

    CycleInput {
        topic,
        reference_image,
        settings,
        text_model: args.text_model.clone().unwrap_or_else(|| prefs.text_model.id.to_string()),
        image_model: args.image_model.clone().unwrap_or_else(|| prefs.image_model.id.to_string()),
        credentials: Credentials {
            openrouter: config.openrouter_key().or(prefs.api_key),
            gemini: config.gemini_key(),
        },
    }
}

/// Pick live, recording, or replaying providers from the environment.
fn open_context(
    config: &Config,
) -> Result<(ServiceContext, Option<RecordingSession>), GenerationError> {
    let replay_path = std::env::var("PROMPTREEL_REPLAY").ok();
    let is_recording = std::env::var("PROMPTREEL_REC").is_ok_and(|v| v == "true" || v == "1");

    if let Some(ref cassette_path) = replay_path {
        tracing::debug!(cassette = %cassette_path, "replaying");
        Ok((ServiceContext::replaying(Path::new(cassette_path))?, None))
    } else if is_recording {
        tracing::debug!("recording enabled");
        let (ctx, session) = ServiceContext::recording(config);
        Ok((ctx, Some(session)))
    } else {
        Ok((ServiceContext::live(config), None))
    }
}

fn finish_recording(recording: Option<RecordingSession>) {
    if let Some(session) = recording {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
}

/// Print whatever the cycle produced, then surface its error.
///
/// A cycle error takes precedence over a failure to save the brief.
fn report(session: &Session, args: &CycleArgs, topic: &str) -> Result<(), GenerationError> {
    let mut save_failure = None;
    if let Some(brief) = &session.brief {
        print_brief(brief, args.json)?;
        if let Some(path) = &args.save_brief {
            match save_brief(brief, path) {
                Ok(()) => eprintln!("Brief saved: {}", path.display()),
                Err(e) if session.error.is_some() => {
                    eprintln!("Warning: failed to save brief: {e}");
                }
                Err(e) => save_failure = Some(e),
            }
        }
    }

    if let Some(thumbnail) = &session.thumbnail {
        match save_thumbnail(thumbnail, args.output.as_deref(), topic)? {
            ThumbnailOutput::Saved(path) => eprintln!("Saved: {}", path.display()),
            ThumbnailOutput::Hosted(url) => eprintln!("Thumbnail: {url}"),
        }
    }

    match &session.error {
        Some(error) => {
            if session.credential_prompt {
                eprintln!("Hint: check your API key, or save one with `promptreel prefs --api-key <KEY>`.");
            }
            Err(GenerationError::Cycle(error.clone()))
        }
        None => save_failure.map_or(Ok(()), Err),
    }
}

fn print_brief(brief: &GeneratedBrief, json: bool) -> Result<(), GenerationError> {
    if json {
        let text = serde_json::to_string_pretty(brief)
            .map_err(|e| GenerationError::InvalidArgument(format!("Failed to encode brief: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", brief.narrative_prompt);
        eprintln!();
        eprintln!("Model:    {}", brief.target_model_name);
        eprintln!("Duration: {}s", brief.duration_seconds);
        eprintln!("Ratio:    {}", brief.aspect_ratio);
        eprintln!("Sound:    {}", brief.sound_design);
        eprintln!("Style:    {}", brief.visual_style);
        eprintln!("Twist:    {}", brief.twist);
    }
    Ok(())
}

fn print_models() {
    print_catalog("Text models", TEXT_MODELS);
    println!();
    print_catalog("Image models", IMAGE_MODELS);
}

fn print_catalog(title: &str, catalog: &[ModelDescriptor]) {
    println!("{title}:");
    for (tier, label) in [(CostTier::Free, "Free"), (CostTier::Paid, "Paid")] {
        println!("  {label}:");
        for model in catalog.iter().filter(|m| m.cost_tier == tier) {
            let mut notes = vec![model.family.display_name()];
            if model.accepts_image_input {
                notes.push("image input");
            }
            if model.requires_credential() {
                notes.push("key required");
            }
            println!("    {:<48} {} [{}]", model.id, model.display_name, notes.join(", "));
        }
    }
}

fn print_ideas() {
    println!("Trending topics:");
    for topic in TREND_TOPICS {
        println!("  {topic}");
    }
    println!();
    println!("Fill in the blank:");
    for template in FILL_IN_BLANK_TEMPLATES {
        println!("  {template}");
    }
}

/// Persist the given values, then show what a run would use.
fn update_prefs(store: &mut dyn KeyValueStore, args: &PrefsArgs) -> Result<(), GenerationError> {
    if let Some(key) = &args.api_key {
        preferences::save_api_key(store, key)?;
    }
    if let Some(id) = &args.text_model {
        preferences::save_text_model(store, id)?;
    }
    if let Some(id) = &args.image_model {
        preferences::save_image_model(store, id)?;
    }
    if args.duration.is_some() || args.ratio.is_some() || args.theme.is_some() {
        let mut settings = Preferences::load(store).settings;
        if let Some(duration) = args.duration {
            settings.duration = duration;
        }
        if let Some(ratio) = args.ratio {
            settings.ratio = ratio;
        }
        if let Some(theme) = args.theme {
            settings.theme = theme;
        }
        preferences::save_settings(store, settings)?;
    }

    let prefs = Preferences::load(store);
    println!("text_model:  {}", prefs.text_model.id);
    println!("image_model: {}", prefs.image_model.id);
    println!("duration:    {}", prefs.settings.duration);
    println!("ratio:       {}", prefs.settings.ratio);
    println!("theme:       {}", prefs.settings.theme);
    println!(
        "api_key:     {}",
        prefs.api_key.as_deref().map_or_else(|| "(not set)".to_string(), mask_secret)
    );
    Ok(())
}
