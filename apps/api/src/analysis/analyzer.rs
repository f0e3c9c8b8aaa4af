//! Analysis pipeline: fingerprint → cache → model → normalize → cache.

use tracing::{debug, info};

use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::analysis::normalize::parse_model_output;
use crate::analysis::prompts::build_analysis_prompt;
use crate::cache::{AnalysisCache, CacheKey};
use crate::errors::AppError;
use crate::llm_client::{Completer, CompletionOptions};

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub cache_key: CacheKey,
    pub cache_hit: bool,
}

/// Returns the cached analysis for `request` or asks the model for a new one.
///
/// Only successfully parsed results are stored. Concurrent calls with the same
/// inputs wait on each other, so the model is asked at most once per key.
pub async fn analyze(
    request: &AnalysisRequest,
    cache: &AnalysisCache,
    llm: &dyn Completer,
) -> Result<AnalysisOutcome, AppError> {
    let cache_key = CacheKey::for_request(request);
    debug!("Cache key: {cache_key}");

    let _guard = cache.key_lock(&cache_key).await;

    if let Some(result) = cache.lookup(&cache_key).await {
        info!("Cache hit for key: {cache_key}");
        return Ok(AnalysisOutcome {
            result,
            cache_key,
            cache_hit: true,
        });
    }
    debug!("Cache miss: {cache_key}");

    let prompt = build_analysis_prompt(request);
    let raw = llm
        .complete(&prompt, &CompletionOptions::default())
        .await?;
    debug!("Raw model output: {raw}");

    let result = parse_model_output(&raw).map_err(AppError::ModelOutput)?;

    cache.store(cache_key.clone(), result.clone()).await;

    Ok(AnalysisOutcome {
        result,
        cache_key,
        cache_hit: false,
    })
}
