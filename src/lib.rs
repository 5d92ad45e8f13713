#![deny(missing_docs)]

//! Core library for docquiz: turns a PDF into a summary and a multiple-choice quiz.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document text extraction.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics helpers.
pub mod metrics;
/// Model capability clients and backends.
pub mod models;
/// Document-to-quiz processing pipeline.
pub mod processing;
