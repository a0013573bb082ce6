//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::params::{validate_duration, AspectRatio};
use crate::preferences::Theme;

/// Viral video prompt builder: director's briefs and thumbnails via `OpenRouter` and Gemini.
#[derive(Parser, Debug)]
#[command(name = "promptreel", version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a director's brief and a matching thumbnail.
    Generate(GenerateArgs),
    /// Generate a fresh brief from a saved brief's narrative.
    Remix(RemixArgs),
    /// List the text and image model catalogs.
    Models,
    /// List quick-fill trend topics and templates.
    Ideas,
    /// Update and show persisted preferences.
    Prefs(PrefsArgs),
}

/// Arguments for `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Topic or idea for the video.
    pub topic: Option<String>,

    /// Quick-fill keyword appended to the topic (repeatable).
    #[arg(short = 'k', long = "keyword")]
    pub keywords: Vec<String>,

    /// Reference image used as visual inspiration.
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub cycle: CycleArgs,
}

/// Arguments for `remix`.
#[derive(Args, Debug)]
pub struct RemixArgs {
    /// Brief JSON written by `--save-brief`.
    pub brief: PathBuf,

    #[command(flatten)]
    pub cycle: CycleArgs,
}

/// Per-run overrides shared by `generate` and `remix`.
#[derive(Args, Debug)]
pub struct CycleArgs {
    /// Text model id (defaults to the saved preference).
    #[arg(long)]
    pub text_model: Option<String>,

    /// Image model id (defaults to the saved preference).
    #[arg(long)]
    pub image_model: Option<String>,

    /// Video duration in seconds: 4, 8, 12.
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<u32>,

    /// Aspect ratio: 16:9, 9:16, 1:1, 4:3, 3:4.
    #[arg(short, long)]
    pub ratio: Option<AspectRatio>,

    /// Thumbnail output path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the brief as JSON to this path.
    #[arg(long)]
    pub save_brief: Option<PathBuf>,

    /// Print the brief as JSON instead of the narrative prompt.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `prefs`.
#[derive(Args, Debug)]
pub struct PrefsArgs {
    /// Save an `OpenRouter` API key.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Save the preferred text model.
    #[arg(long)]
    pub text_model: Option<String>,

    /// Save the preferred image model.
    #[arg(long)]
    pub image_model: Option<String>,

    /// Save the default duration.
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<u32>,

    /// Save the default aspect ratio.
    #[arg(short, long)]
    pub ratio: Option<AspectRatio>,

    /// Save the theme: dark, light.
    #[arg(long)]
    pub theme: Option<Theme>,
}

fn parse_duration(value: &str) -> Result<u32, String> {
    let seconds: u32 = value.parse().map_err(|_| format!("'{value}' is not a number of seconds"))?;
    validate_duration(seconds)?;
    Ok(seconds)
}
