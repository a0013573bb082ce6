//! Recording adapter for the `GenerationProvider` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::provider::{
    BriefFuture, BriefRequest, GenerationProvider, ThumbnailFuture, ThumbnailRequest,
};

/// Cassette port name shared by every provider family.
pub const PORT: &str = "provider";

/// Records provider interactions while delegating to an inner implementation.
pub struct RecordingProvider {
    inner: Box<dyn GenerationProvider>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProvider {
    /// Creates a new recording provider wrapping the given implementation.
    pub fn new(inner: Box<dyn GenerationProvider>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GenerationProvider for RecordingProvider {
    fn generate_brief(&self, request: &BriefRequest) -> BriefFuture<'_> {
        let request_clone = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.generate_brief(&request_clone).await;
            record_result(&recorder, PORT, "generate_brief", &request_clone, &result);
            result
        })
    }

    fn generate_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailFuture<'_> {
        let request_clone = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.generate_thumbnail(&request_clone).await;
            record_result(&recorder, PORT, "generate_thumbnail", &request_clone, &result);
            result
        })
    }
}
