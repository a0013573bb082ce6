//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every port call made during one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable recording name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

/// One port call and its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Global call sequence number.
    pub seq: u64,
    /// Port name, e.g. `"provider"`.
    pub port: String,
    /// Method name, e.g. `"generate_brief"`.
    pub method: String,
    /// Serialized request.
    pub input: serde_json::Value,
    /// `{"Ok": ...}` or `{"Err": "..."}`.
    pub output: serde_json::Value,
}
