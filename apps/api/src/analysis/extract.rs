//! Resume document → plain text.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Extractor task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Opaque text-extraction capability. Carried in `AppState` as `Arc<dyn DocumentExtractor>`.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, document: Vec<u8>) -> Result<String, ExtractError>;
}

/// Extracts text from PDF uploads with `pdf-extract`.
///
/// Parsing runs on the blocking pool; a panic inside the parser surfaces as
/// `ExtractError::Task` instead of taking the worker down. Pages without a
/// text layer contribute nothing, so a scanned resume yields empty text.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: Vec<u8>) -> Result<String, ExtractError> {
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
                .map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await??;

        debug!("Extracted {} chars from PDF", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_bytes_are_rejected() {
        let result = PdfTextExtractor
            .extract_text(b"definitely not a pdf".to_vec())
            .await;
        assert!(result.is_err());
    }
}
