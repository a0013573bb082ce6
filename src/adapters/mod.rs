//! Adapter implementations for port traits.
//!
//! - `live/`: Real API implementations
//! - `recording/`: Record interactions to cassettes
//! - `replaying/`: Replay interactions from cassettes
//! - `store`: File-backed preference storage

pub mod live;
pub mod recording;
pub mod replaying;
pub mod store;
