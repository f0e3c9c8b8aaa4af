use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::normalize::normalize_text;

/// A resume/job pair with whitespace already collapsed.
///
/// Construct through [`AnalysisRequest::new`] so the fingerprint and the prompt
/// always see the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_posting: String,
}

impl AnalysisRequest {
    pub fn new(resume_text: &str, job_posting: &str) -> Self {
        Self {
            resume_text: normalize_text(resume_text),
            job_posting: normalize_text(job_posting),
        }
    }
}

/// Skill-match report returned to callers and stored in the cache file.
///
/// Deserialization doubles as schema validation of the model output: every
/// list must be present and contain only strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub hard_skills_resume: Vec<String>,
    pub hard_skills_job: Vec<String>,
    pub soft_skills_resume: Vec<String>,
    pub soft_skills_job: Vec<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    #[serde(deserialize_with = "deserialize_fit_score")]
    pub fit_score: u32, // 0 – 100
}

/// Accepts `60`, `60.0` or `59.6` and clamps into 0..=100.
fn deserialize_fit_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("fit_score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u32)
}

/// Body returned when the model output cannot be turned into an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutputError {
    pub error: String,
    pub raw_output: String,
}
