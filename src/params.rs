//! Generation parameters and their provider-specific translations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target video aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait.
    #[serde(rename = "9:16")]
    Portrait,
    /// 1:1 square.
    #[serde(rename = "1:1")]
    Square,
    /// 4:3 classic.
    #[serde(rename = "4:3")]
    Classic,
    /// 3:4 vertical.
    #[serde(rename = "3:4")]
    Vertical,
}

impl AspectRatio {
    /// All supported ratios, in picker order.
    pub const ALL: [Self; 5] =
        [Self::Landscape, Self::Portrait, Self::Square, Self::Classic, Self::Vertical];

    /// The `W:H` string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Classic => "4:3",
            Self::Vertical => "3:4",
        }
    }

    /// Pixel dimensions for models that take explicit `width`/`height`.
    #[must_use]
    pub fn pixel_dimensions(self) -> (u32, u32) {
        match self {
            Self::Landscape => (1344, 768),
            Self::Portrait => (768, 1344),
            Self::Square => (1024, 1024),
            Self::Classic => (1152, 896),
            Self::Vertical => (896, 1152),
        }
    }

    /// `size` string for models with the `OpenAI` images contract.
    ///
    /// Those models only offer `1792x1024`, `1024x1792` and `1024x1024`.
    #[must_use]
    pub fn openai_size(self) -> &'static str {
        match self {
            Self::Landscape => "1792x1024",
            Self::Portrait => "1024x1792",
            Self::Square | Self::Classic | Self::Vertical => "1024x1024",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|r| r.as_str() == s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|r| r.as_str()).collect();
            format!("Unsupported aspect ratio '{s}'. Valid: {}", valid.join(", "))
        })
    }
}

/// How an image model expects the output shape in its request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageShape {
    /// `size: "WxH"` plus `n` and `response_format`.
    SizeString,
    /// `aspect_ratio: "W:H"` plus `n` and `response_format`.
    AspectRatioField,
    /// Integer `width` and `height`; no `n` or `response_format`.
    Dimensions,
}

/// Durations offered by the duration picker, in seconds.
pub const DURATION_CHOICES: [u32; 3] = [4, 8, 12];

/// Default video duration in seconds.
pub const DEFAULT_DURATION: u32 = 8;

/// Validate a video duration.
///
/// # Errors
///
/// Returns an error if the duration is not one of [`DURATION_CHOICES`].
pub fn validate_duration(seconds: u32) -> Result<(), String> {
    if DURATION_CHOICES.contains(&seconds) {
        Ok(())
    } else {
        Err(format!("Unsupported duration '{seconds}'. Valid: 4, 8, 12"))
    }
}
