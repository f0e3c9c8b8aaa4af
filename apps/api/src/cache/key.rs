//! Request fingerprints.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::models::AnalysisRequest;

/// Hex SHA-256 over `resume_text ++ job_posting` (already normalized).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_request(request: &AnalysisRequest) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(request.resume_text.as_bytes());
        hasher.update(request.job_posting.as_bytes());
        CacheKey(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
