//! Unified error type for promptreel.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The outbound operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Director's brief generation (text model).
    Brief,
    /// Thumbnail generation (image model).
    Thumbnail,
}

impl Operation {
    /// Which model produced a malformed payload, for format errors.
    #[must_use]
    pub fn producer(self) -> &'static str {
        match self {
            Self::Brief => "The AI model",
            Self::Thumbnail => "The image model",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brief => f.write_str("generate prompt"),
            Self::Thumbnail => f.write_str("generate thumbnail"),
        }
    }
}

/// Errors that can occur while producing a brief or thumbnail.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A provider returned a non-success status.
    #[error("Failed to {operation}. Status: {status}: {message}")]
    Api {
        /// Which call failed.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// A provider returned success but the payload could not be used.
    #[error("{producer} returned an invalid format. {diagnostic}", producer = .operation.producer())]
    InvalidFormat {
        /// Which call produced the payload.
        operation: Operation,
        /// Parser diagnostic.
        diagnostic: String,
    },

    /// The image response contained neither inline bytes nor a URL.
    #[error("No image was generated or the response format was unexpected.")]
    NoImage,

    /// The selected model needs a credential that is not configured.
    #[error(
        "{family} API key is required for {model}. Set {env_var}, add it to the config file, \
         or run `promptreel prefs --api-key <KEY>`."
    )]
    MissingCredential {
        /// Model id that was selected.
        model: String,
        /// Provider family display name.
        family: String,
        /// Environment variable that can supply the key.
        env_var: String,
    },

    /// Neither a topic nor a brief to remix was supplied.
    #[error("Please enter a topic or idea.")]
    MissingTopic,

    /// The model id is not in the catalog.
    #[error("Unknown model '{0}'. Run `promptreel models` to list the catalog.")]
    UnknownModel(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An error served from a cassette, surfaced verbatim.
    #[error("{0}")]
    Replayed(String),

    /// A generation cycle ended in the errored state.
    #[error("{0}")]
    Cycle(String),
}

impl GenerationError {
    /// Whether the user should be asked to re-enter their credential.
    #[must_use]
    pub fn is_credential_problem(&self) -> bool {
        match self {
            Self::MissingCredential { .. } | Self::Api { status: 401 | 403, .. } => true,
            other => mentions_credential(&other.to_string()),
        }
    }
}

/// Heuristic used for messages that come back from providers or cassettes.
#[must_use]
pub fn mentions_credential(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["api key", "api_key", "unauthorized", "credential", "authentication"]
        .iter()
        .any(|needle| lower.contains(needle))
}
