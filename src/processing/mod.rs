//! Summarization pipeline: validation, extraction dispatch, and remote summarization.

mod service;
pub mod types;

pub use service::{SummarizationService, SummarizeApi};
pub use types::{MIN_TEXT_LENGTH, ProcessingError, SummaryResult};
