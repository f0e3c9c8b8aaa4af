//! Post-processing applied to everything the model returns.
//!
//! Algorithm:
//! 1. `matched` entries of the form `"A ≈ A"` collapse to `"A"`; real synonym
//!    pairs and plain entries pass through untouched.
//! 2. `fit_score = floor(matched / (hard_skills_job + soft_skills_job) × 100)`,
//!    overwriting the model's value unless the denominator is zero.

use tracing::warn;

use crate::analysis::models::{AnalysisResult, ModelOutputError};
use crate::llm_client::strip_json_fences;

pub const SIMILARITY_MARKER: char = '≈';

pub const INVALID_JSON: &str = "Invalid JSON from model";
pub const SCHEMA_MISMATCH: &str = "Model output does not match analysis schema";

/// Collapses every whitespace run to a single space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites `"X ≈ X"` as `"X"`. Comparison is exact after trimming.
pub fn clean_match(entry: &str) -> String {
    match entry.split_once(SIMILARITY_MARKER) {
        Some((left, right)) if left.trim() == right.trim() => left.trim().to_string(),
        _ => entry.to_string(),
    }
}

/// Share of job skills covered by `matched`, as a floored percentage.
/// Returns `None` when the job lists no skills at all.
pub fn compute_fit_score(matched: usize, job_skills: usize) -> Option<u32> {
    if job_skills == 0 {
        return None;
    }
    let score = (matched * 100) / job_skills;
    Some(score.min(100) as u32)
}

/// Applies matched-pair cleanup and the fit-score recompute.
pub fn normalize_analysis(mut result: AnalysisResult) -> AnalysisResult {
    result.matched = result.matched.iter().map(|m| clean_match(m)).collect();

    let job_skills = result.hard_skills_job.len() + result.soft_skills_job.len();
    if let Some(score) = compute_fit_score(result.matched.len(), job_skills) {
        result.fit_score = score;
    }
    result
}

/// Parses raw model text into a canonical [`AnalysisResult`].
///
/// Never panics: malformed text and schema violations come back as a
/// [`ModelOutputError`] carrying the raw text for the caller.
pub fn parse_model_output(raw: &str) -> Result<AnalysisResult, ModelOutputError> {
    let value: serde_json::Value = match serde_json::from_str(strip_json_fences(raw)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model output is not JSON: {e}");
            return Err(ModelOutputError {
                error: INVALID_JSON.to_string(),
                raw_output: raw.to_string(),
            });
        }
    };

    let result: AnalysisResult = serde_json::from_value(value).map_err(|e| {
        warn!("Model output failed schema validation: {e}");
        ModelOutputError {
            error: SCHEMA_MISMATCH.to_string(),
            raw_output: raw.to_string(),
        }
    })?;

    Ok(normalize_analysis(result))
}
