//! External services.

pub mod ffprobe;
pub mod probe_cache;

pub use ffprobe::{MediaProbe, ResolutionProbe};
pub use probe_cache::ResolutionCache;
