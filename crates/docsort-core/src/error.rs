// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docsort.

use thiserror::Error;

/// Top-level error type for all Docsort operations.
///
/// A failed OCR submission never surfaces here; the extraction layer turns it
/// into empty text. `OcrError` reaches callers only when the engine itself
/// cannot be built (missing or corrupt models).
#[derive(Debug, Error)]
pub enum DocsortError {
    // -- Batch preconditions --
    #[error("no documents supplied")]
    NoDocuments,

    #[error("first name and last name are both required")]
    MissingIdentity,

    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("batch worker failed: {0}")]
    Worker(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsortError>;
