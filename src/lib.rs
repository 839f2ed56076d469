#![deny(missing_docs)]

//! Core library for the Cruxify summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Text extraction from PDFs, Word documents, and images.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters.
pub mod metrics;
/// Validation and summarization pipeline.
pub mod processing;
/// Remote chat-completion client abstraction and adapters.
pub mod summarization;
