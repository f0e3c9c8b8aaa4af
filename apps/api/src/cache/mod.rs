// Fingerprint cache: finished analyses keyed by a hash of the normalized inputs.
// The whole map lives in memory and is mirrored to a single JSON file.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::AnalysisCache;
