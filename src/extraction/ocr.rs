//! OCR engines for image uploads.
//!
//! [`TesseractOcr`] shells out to the `tesseract` CLI: the decoded image is re-encoded as PNG,
//! streamed on stdin (`tesseract stdin stdout`), and the recognised text is read from stdout.
//! The child is awaited on the runtime so OCR never blocks other requests.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors raised by OCR engines.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Image could not be re-encoded for the engine.
    #[error("failed to encode image for OCR: {0}")]
    Encode(String),
    /// Engine process could not be started or fed.
    #[error("failed to run {command}: {source}")]
    Launch {
        /// Executable that was invoked.
        command: String,
        /// I/O error reported by the OS.
        #[source]
        source: std::io::Error,
    },
    /// Engine ran but reported an error.
    #[error("{0}")]
    Engine(String),
}

/// Interface implemented by OCR backends.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognise the text in a decoded image.
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError>;
}

/// OCR backed by the Tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    /// Use the given executable (a bare name is resolved through `PATH`).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn launch_error(&self, source: std::io::Error) -> OcrError {
        OcrError::Launch {
            command: self.command.clone(),
            source,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: DynamicImage) -> Result<String, OcrError> {
        let png = tokio::task::spawn_blocking(move || {
            let mut buffer = Cursor::new(Vec::new());
            image
                .write_to(&mut buffer, ImageFormat::Png)
                .map(|()| buffer.into_inner())
                .map_err(|error| OcrError::Encode(error.to_string()))
        })
        .await
        .map_err(|error| OcrError::Encode(error.to_string()))??;

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| self.launch_error(error))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|error| self.launch_error(error))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|error| self.launch_error(error))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(chars = text.chars().count(), "OCR completed");
        Ok(text)
    }
}
