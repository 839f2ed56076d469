//! Core data types and error definitions for the summarization pipeline.

use crate::extraction::ExtractionError;
use crate::summarization::SummarizationClientError;
use serde::Serialize;
use thiserror::Error;

/// Minimum number of characters accepted for summarization.
pub const MIN_TEXT_LENGTH: usize = 50;

/// Errors emitted by the summarization pipeline. Every variant is terminal for the request.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Submitted text was empty or whitespace only.
    #[error("Text cannot be empty")]
    EmptyInput,
    /// Submitted text is shorter than [`MIN_TEXT_LENGTH`].
    #[error("Text too short to summarize (minimum {} characters)", MIN_TEXT_LENGTH)]
    TextTooShort,
    /// Extraction succeeded but produced only whitespace.
    #[error("No text could be extracted from the file")]
    NoTextExtracted,
    /// Extracted text is shorter than [`MIN_TEXT_LENGTH`].
    #[error("Extracted text too short to summarize (minimum {} characters)", MIN_TEXT_LENGTH)]
    ExtractedTextTooShort,
    /// Upload's file type is not supported, or the reader rejected its content.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Remote summarization failed.
    #[error("Error generating summary: {0}")]
    SummarizationFailed(#[from] SummarizationClientError),
}

impl ProcessingError {
    /// Whether the failure was caused by the caller's input rather than the remote provider.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::SummarizationFailed(_))
    }
}

/// Summary produced for one request, with character counts of input and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    /// Summary text returned by the model, trimmed.
    pub summary: String,
    /// Character count of the text that was summarized.
    pub original_length: usize,
    /// Character count of [`SummaryResult::summary`].
    pub summary_length: usize,
}

impl SummaryResult {
    /// Package a summary with the length statistics of its source text.
    pub fn new(original: &str, summary: String) -> Self {
        Self {
            original_length: char_length(original),
            summary_length: char_length(&summary),
            summary,
        }
    }
}

/// Length in Unicode scalar values, which is what callers see as "characters".
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}
