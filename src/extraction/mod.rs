//! Plain-text extraction from uploaded documents and images.
//!
//! The upload's file name is resolved into a [`Format`] exactly once, at the boundary; the
//! [`Extractor`] then dispatches on that closed enum to one of three strategies:
//!
//! - PDF: per-page text via `lopdf`, joined with newlines.
//! - Word: per-paragraph text from `word/document.xml`, joined with newlines.
//! - Image: decode with `image`, then hand the picture to an [`OcrEngine`].
//!
//! Parsing is CPU-bound and runs on the blocking pool. Nothing touches the filesystem.

mod docx;
mod ocr;
mod pdf;

pub use ocr::{OcrEngine, OcrError, TesseractOcr};

use image::ImageFormat;
use std::fmt;
use thiserror::Error;

/// Errors raised while turning uploaded bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File extension is not one of the supported document or image types.
    #[error("{}", unsupported_message(.0))]
    UnsupportedFormat(String),
    /// Underlying reader rejected the content; `reason` carries its message verbatim.
    #[error("Error extracting text from {format}: {reason}")]
    Failed {
        /// Format the extractor was attempting to read.
        format: Format,
        /// Message reported by the underlying library or tool.
        reason: String,
    },
}

fn unsupported_message(extension: &str) -> String {
    let kind = if extension.is_empty() {
        "Unsupported file type (no extension)".to_string()
    } else {
        format!("Unsupported file type '.{extension}'")
    };
    format!("{kind}. Please upload PDF, DOCX, or image files.")
}

/// Raster formats accepted for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Portable Network Graphics.
    Png,
    /// JPEG (`.jpg` / `.jpeg`).
    Jpeg,
    /// Graphics Interchange Format.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Tagged Image File Format.
    Tiff,
}

impl ImageKind {
    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Document type that selects the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable Document Format.
    Pdf,
    /// Word document (`.docx`, and `.doc` by name).
    Docx,
    /// Raster image read through OCR.
    Image(ImageKind),
}

impl Format {
    /// Resolve the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
            .unwrap_or_default();

        let format = match extension.as_str() {
            "pdf" => Self::Pdf,
            "docx" | "doc" => Self::Docx,
            "png" => Self::Image(ImageKind::Png),
            "jpg" | "jpeg" => Self::Image(ImageKind::Jpeg),
            "gif" => Self::Image(ImageKind::Gif),
            "bmp" => Self::Image(ImageKind::Bmp),
            "tiff" => Self::Image(ImageKind::Tiff),
            _ => return Err(ExtractionError::UnsupportedFormat(extension)),
        };
        Ok(format)
    }

    fn failure(self, reason: impl fmt::Display) -> ExtractionError {
        ExtractionError::Failed {
            format: self,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("PDF"),
            Self::Docx => f.write_str("DOCX"),
            Self::Image(_) => f.write_str("image"),
        }
    }
}

/// Dispatches uploaded bytes to the extraction strategy for their [`Format`].
pub struct Extractor {
    ocr: Box<dyn OcrEngine>,
}

impl Extractor {
    /// Build an extractor that uses `ocr` for image inputs.
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Produce trimmed plain text from `bytes` interpreted as `format`.
    pub async fn extract(&self, bytes: Vec<u8>, format: Format) -> Result<String, ExtractionError> {
        tracing::debug!(%format, bytes = bytes.len(), "Extracting text");
        let text = match format {
            Format::Pdf => run_blocking(format, move || pdf::extract_text(&bytes)).await?,
            Format::Docx => run_blocking(format, move || docx::extract_text(&bytes)).await?,
            Format::Image(kind) => {
                let image = run_blocking(format, move || decode_image(&bytes, kind)).await?;
                self.ocr
                    .recognize(image)
                    .await
                    .map_err(|error| format.failure(error))?
            }
        };
        Ok(text.trim().to_string())
    }
}

fn decode_image(bytes: &[u8], kind: ImageKind) -> Result<image::DynamicImage, String> {
    let format = image::guess_format(bytes).unwrap_or(kind.image_format());
    image::load_from_memory_with_format(bytes, format).map_err(|error| error.to_string())
}

async fn run_blocking<T, F>(format: Format, job: F) -> Result<T, ExtractionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|error| format.failure(format!("extraction task aborted: {error}")))?
        .map_err(|reason| format.failure(reason))
}
