// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// First-page rendering through Google PDFium (`pdfium-render`).
//
// PDFium draws the whole page: text, vector art and embedded scans alike.
// The library is bound at runtime, so a machine without it still works: the
// rasteriser then falls back to `LopdfRasterizer`.
//
// `Pdfium` is `!Send`, so every call binds a fresh instance; the OS caches
// the `dlopen`, which keeps repeat binds cheap.

use std::path::PathBuf;

use docsort_core::error::{DocsortError, Result};
use pdfium_render::prelude::*;
use tracing::{debug, instrument, warn};

use crate::extract::PdfRasterizer;
use crate::image::processor::ImageProcessor;
use crate::pdf::raster::{DEFAULT_RENDER_DPI, LopdfRasterizer, render_dimensions};

/// Explicit path to the PDFium shared library.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// Renders the first page with PDFium, or with [`LopdfRasterizer`] when the
/// PDFium library cannot be found.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer {
    fallback: LopdfRasterizer,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the PDFium library can be bound on this machine.
    pub fn pdfium_available() -> bool {
        load_pdfium().is_ok()
    }
}

impl PdfRasterizer for PdfiumRasterizer {
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        match load_pdfium() {
            Ok(pdfium) => render_first_page(&pdfium, pdf_bytes),
            Err(err) => {
                warn!(%err, "PDFium unavailable, using embedded-image extraction");
                self.fallback.rasterize_first_page(pdf_bytes)
            }
        }
    }
}

/// Bind PDFium from `$PDFIUM_DYNAMIC_LIB_PATH`, then next to the running
/// executable (and its `lib/`), then from the system library path.
fn load_pdfium() -> Result<Pdfium> {
    if let Ok(path) = std::env::var(PDFIUM_LIB_ENV) {
        debug!(%path, "Binding PDFium from environment");
        let bindings = Pdfium::bind_to_library(&path).map_err(|err| {
            DocsortError::PdfError(format!("cannot load PDFium from {path}: {err}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    for dir in executable_dirs() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(dir.to_string_lossy().as_ref());
        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            debug!(dir = %dir.display(), "Bound PDFium next to executable");
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|err| {
        DocsortError::PdfError(format!(
            "PDFium library not found (set {PDFIUM_LIB_ENV} or install PDFium): {err}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

fn executable_dirs() -> Vec<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| vec![dir.to_path_buf(), dir.join("lib")]))
        .unwrap_or_default()
}

fn render_first_page(pdfium: &Pdfium, pdf_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(map_load_error)?;

    let pages = document.pages();
    if pages.len() == 0 {
        debug!("PDF has no pages");
        return Ok(None);
    }
    let page = pages
        .get(0)
        .map_err(|err| DocsortError::PdfError(format!("cannot open first page: {err}")))?;

    let (width, height) = render_dimensions(page.width().value, page.height().value, DEFAULT_RENDER_DPI);
    let config = PdfRenderConfig::new()
        .set_target_width(width as i32)
        .set_maximum_height(height as i32);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|err| DocsortError::PdfError(format!("rendering failed: {err}")))?;

    let png = ImageProcessor::from_dynamic(bitmap.as_image()).to_png_bytes()?;
    debug!(width, height, png_bytes = png.len(), "First page rendered");
    Ok(Some(png))
}

/// Password-protected files get their own message; everything else is a
/// malformed PDF.
fn map_load_error(err: PdfiumError) -> DocsortError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        DocsortError::PdfError(format!("PDF is password-protected: {message}"))
    } else {
        DocsortError::PdfError(format!("failed to load PDF: {message}"))
    }
}
