// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction orchestrator — one uploaded document in, one text blob out.
//
// Images go straight to the OCR service. PDFs have their first page
// rasterised and submitted the same way. OCR service errors degrade to empty
// text; rasterisation errors propagate.

use docsort_core::error::Result;
use docsort_core::types::{DocumentFormat, UploadedDocument};
use tracing::{debug, instrument, warn};

use super::{OcrService, PdfRasterizer};

/// Produces the text of an uploaded document through injected collaborators.
pub struct TextExtractor<O, R> {
    ocr: O,
    rasterizer: R,
}

impl<O: OcrService, R: PdfRasterizer> TextExtractor<O, R> {
    pub fn new(ocr: O, rasterizer: R) -> Self {
        Self { ocr, rasterizer }
    }

    /// Extract the text of `document`.
    ///
    /// An empty string is a valid outcome ("no text recognised"). Only a
    /// malformed PDF produces an error.
    #[instrument(skip_all, fields(document = %document.name, format = ?document.format))]
    pub fn extract_text(&self, document: &UploadedDocument) -> Result<String> {
        let text = match document.format {
            DocumentFormat::Image => self.recognize(&document.bytes).unwrap_or_default(),
            DocumentFormat::Pdf => {
                let Some(page) = self.rasterizer.rasterize_first_page(&document.bytes)? else {
                    debug!("PDF has no pages, nothing to recognise");
                    return Ok(String::new());
                };
                let mut text = String::new();
                if let Some(page_text) = self.recognize(&page) {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                text
            }
        };

        debug!(chars = text.chars().count(), "Text extracted");
        Ok(text)
    }

    /// Submit one image to the OCR service. `None` when the service reported
    /// an error.
    fn recognize(&self, image_bytes: &[u8]) -> Option<String> {
        let response = self.ocr.detect_text(image_bytes);
        if response.is_error() {
            let message = response.error.map(|err| err.message).unwrap_or_default();
            warn!(%message, "OCR service reported an error, treating as no text");
            return None;
        }
        Some(response.text)
    }
}

/// Free-function form of [`TextExtractor::extract_text`].
pub fn extract_text(
    document: &UploadedDocument,
    ocr: &impl OcrService,
    rasterizer: &impl PdfRasterizer,
) -> Result<String> {
    TextExtractor::new(ocr, rasterizer).extract_text(document)
}

impl<T: OcrService + ?Sized> OcrService for &T {
    fn detect_text(&self, image_bytes: &[u8]) -> super::OcrResponse {
        (**self).detect_text(image_bytes)
    }
}

impl<T: PdfRasterizer + ?Sized> PdfRasterizer for &T {
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).rasterize_first_page(pdf_bytes)
    }
}
