//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod provider;
pub mod settings_store;

pub use provider::{
    BriefRequest, Credentials, GeneratedBrief, GenerationProvider, GenerationSettings,
    ReferenceImage, ThumbnailRequest, ThumbnailResult,
};
pub use settings_store::KeyValueStore;
