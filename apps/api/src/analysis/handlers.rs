//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::analysis::analyzer::analyze;
use crate::analysis::models::AnalysisRequest;
use crate::errors::AppError;
use crate::state::AppState;

pub const RESUME_FIELD: &str = "resume";
pub const JOB_POSTING_FIELD: &str = "job_posting";
pub const CACHE_HEADER: &str = "x-cache";

/// POST /analyze
///
/// Multipart form: `resume` (PDF file) and `job_posting` (text).
/// Returns the skill-match report; `x-cache` tells whether it was computed fresh.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut resume: Option<Vec<u8>> = None;
    let mut job_posting: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(RESUME_FIELD) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume upload: {e}")))?;
                resume = Some(bytes.to_vec());
            }
            Some(JOB_POSTING_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job_posting: {e}")))?;
                job_posting = Some(text);
            }
            other => warn!("Ignoring unexpected form field {other:?}"),
        }
    }

    let resume = resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let job_posting = job_posting
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_posting cannot be empty".to_string()))?;

    let resume_text = state.extractor.extract_text(resume).await?;
    if resume_text.trim().is_empty() {
        info!("Resume produced no extractable text; analyzing anyway");
    }

    let request = AnalysisRequest::new(&resume_text, &job_posting);
    let outcome = analyze(&request, &state.cache, state.llm.as_ref()).await?;
    info!(
        "Analysis for {} served (cache_hit={}, fit_score={})",
        outcome.cache_key, outcome.cache_hit, outcome.result.fit_score
    );

    let mut response = Json(outcome.result).into_response();
    response.headers_mut().insert(
        CACHE_HEADER,
        HeaderValue::from_static(if outcome.cache_hit { "hit" } else { "miss" }),
    );
    Ok(response)
}
