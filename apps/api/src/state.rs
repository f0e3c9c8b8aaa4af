use std::sync::Arc;

use crate::analysis::extract::DocumentExtractor;
use crate::cache::AnalysisCache;
use crate::config::Config;
use crate::llm_client::Completer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide analysis cache; handles its own locking.
    pub cache: Arc<AnalysisCache>,
    /// Model backend. Default: `LlmClient` against the chat-completions API.
    pub llm: Arc<dyn Completer>,
    /// Resume text extraction. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn DocumentExtractor>,
    pub config: Config,
}
