// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction — the collaborator traits (OCR service, PDF rasteriser) and
// the orchestrator that turns one uploaded document into one text blob.

pub mod orchestrator;

pub use orchestrator::{TextExtractor, extract_text};

use docsort_core::error::Result;

/// Error reported by an OCR backend for a single submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrErrorInfo {
    pub message: String,
}

/// What an OCR backend returns for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrResponse {
    /// Full recognised text, exactly as the backend produced it.
    pub text: String,
    pub error: Option<OcrErrorInfo>,
}

impl OcrResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(OcrErrorInfo {
                message: message.into(),
            }),
        }
    }

    /// A response counts as failed only when it carries a non-empty message.
    pub fn is_error(&self) -> bool {
        self.error.as_ref().is_some_and(|err| !err.message.is_empty())
    }
}

/// Text detection on a single encoded image (PNG, JPEG, ...).
///
/// Implementations report recognition problems through
/// [`OcrResponse::error`] rather than panicking or blocking forever.
pub trait OcrService: Send + Sync {
    fn detect_text(&self, image_bytes: &[u8]) -> OcrResponse;
}

/// Turns the first page of a PDF into an encoded image.
pub trait PdfRasterizer: Send + Sync {
    /// Returns `Ok(None)` for a PDF with no pages. Malformed PDFs are errors.
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Option<Vec<u8>>>;
}
