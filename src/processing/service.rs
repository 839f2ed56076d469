//! Summarization service coordinating validation, extraction, and the remote model call.

use crate::{
    config::Config,
    extraction::{Extractor, Format, TesseractOcr},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::types::{MIN_TEXT_LENGTH, ProcessingError, SummaryResult, char_length},
    summarization::{
        ChatCompletionClient, ChatCompletionRequest, ChatMessage, OpenAiCompatibleClient,
        SummarizationClientError,
    },
};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are a professional summarizer assistant. Provide a concise and informative summary of the given text. Focus on key points and main ideas. Only provide the summary with no additional content.";
const MAX_SUMMARY_TOKENS: u32 = 500;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Abstraction over the summarization pipeline used by the HTTP surface.
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Validate and summarize text submitted directly by the caller.
    async fn summarize_text(&self, text: &str) -> Result<SummaryResult, ProcessingError>;

    /// Extract text from an uploaded file, validate it, and summarize it.
    async fn summarize_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryResult, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Runs the linear validate → extract → summarize → package flow.
///
/// The service holds no per-request state; share it through an `Arc` and call it from as many
/// tasks as needed.
pub struct SummarizationService {
    client: Box<dyn ChatCompletionClient>,
    extractor: Extractor,
    model: String,
    metrics: SummaryMetrics,
}

impl SummarizationService {
    /// Build a service from explicit collaborators.
    pub fn new(
        client: Box<dyn ChatCompletionClient>,
        extractor: Extractor,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            extractor,
            model: model.into(),
            metrics: SummaryMetrics::new(),
        }
    }

    /// Build the production service: OpenAI-compatible client and Tesseract OCR.
    pub fn from_config(config: &Config) -> Result<Self, SummarizationClientError> {
        tracing::info!(model = %config.summary_model, "Initializing summarization client");
        let client = OpenAiCompatibleClient::from_config(config)?;
        let extractor = Extractor::new(Box::new(TesseractOcr::new(
            config.tesseract_command.clone(),
        )));
        Ok(Self::new(
            Box::new(client),
            extractor,
            config.summary_model.clone(),
        ))
    }

    async fn summarize_validated(&self, text: &str) -> Result<SummaryResult, ProcessingError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(text),
            max_tokens: MAX_SUMMARY_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
        };
        let summary = self.client.complete(request).await?;
        Ok(SummaryResult::new(text, summary.trim().to_string()))
    }

    async fn extract_and_summarize(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryResult, ProcessingError> {
        let format = Format::from_file_name(file_name)?;
        let extracted = self.extractor.extract(bytes, format).await?;

        if extracted.trim().is_empty() {
            return Err(ProcessingError::NoTextExtracted);
        }
        if char_length(&extracted) < MIN_TEXT_LENGTH {
            return Err(ProcessingError::ExtractedTextTooShort);
        }

        tracing::debug!(
            file_name,
            %format,
            extracted_chars = char_length(&extracted),
            "Extracted text from upload"
        );
        self.summarize_validated(&extracted).await
    }

    fn record<T>(
        &self,
        outcome: Result<T, ProcessingError>,
        on_success: fn(&SummaryMetrics),
    ) -> Result<T, ProcessingError> {
        match &outcome {
            Ok(_) => on_success(&self.metrics),
            Err(_) => self.metrics.record_failure(),
        }
        outcome
    }
}

#[async_trait]
impl SummarizeApi for SummarizationService {
    async fn summarize_text(&self, text: &str) -> Result<SummaryResult, ProcessingError> {
        let outcome = match validate_text(text) {
            Ok(()) => self.summarize_validated(text).await,
            Err(error) => Err(error),
        };
        self.record(outcome, SummaryMetrics::record_text)
    }

    async fn summarize_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryResult, ProcessingError> {
        let outcome = self.extract_and_summarize(file_name, bytes).await;
        self.record(outcome, SummaryMetrics::record_file)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn validate_text(text: &str) -> Result<(), ProcessingError> {
    if text.trim().is_empty() {
        return Err(ProcessingError::EmptyInput);
    }
    if char_length(text) < MIN_TEXT_LENGTH {
        return Err(ProcessingError::TextTooShort);
    }
    Ok(())
}

/// System instruction plus the literal text to summarize.
fn build_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("Please summarize the following text:\n\n{text}")),
    ]
}
