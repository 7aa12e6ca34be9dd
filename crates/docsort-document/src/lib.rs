// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsort-document — Turning uploaded documents into text.
//
// Provides first-page PDF rasterisation (PDFium, with embedded scan
// extraction as fallback), image decoding/encoding, an optional local OCR
// engine, and the extraction orchestrator that produces one text blob per
// document.

pub mod extract;
pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `docsort_document::TextExtractor` etc.
pub use extract::{OcrErrorInfo, OcrResponse, OcrService, PdfRasterizer, TextExtractor};
pub use image::processor::ImageProcessor;
pub use pdf::pdfium::PdfiumRasterizer;
pub use pdf::raster::LopdfRasterizer;
pub use pdf::reader::PdfReader;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrEngine;
