//! Replaying adapter for the `GenerationProvider` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::adapters::recording::provider::PORT;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::GenerationError;
use crate::ports::provider::{
    BriefFuture, BriefRequest, GeneratedBrief, GenerationProvider, ThumbnailFuture,
    ThumbnailRequest, ThumbnailResult,
};

/// Serves recorded brief and thumbnail results from a cassette.
pub struct ReplayingProvider {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingProvider {
    /// Create a replaying provider backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl GenerationProvider for ReplayingProvider {
    fn generate_brief(&self, _request: &BriefRequest) -> BriefFuture<'_> {
        let output = next_output(&self.replayer, PORT, "generate_brief");
        Box::pin(async move {
            replay_result::<GeneratedBrief>(output?).map_err(GenerationError::Replayed)
        })
    }

    fn generate_thumbnail(&self, _request: &ThumbnailRequest) -> ThumbnailFuture<'_> {
        let output = next_output(&self.replayer, PORT, "generate_thumbnail");
        Box::pin(async move {
            replay_result::<ThumbnailResult>(output?).map_err(GenerationError::Replayed)
        })
    }
}
