// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// First-page rasteriser backed by `lopdf` embedded-image extraction, plus the
// page sizing shared with the PDFium renderer.

use docsort_core::error::Result;
use image::{DynamicImage, GrayImage, Luma};
use tracing::{debug, instrument, warn};

use crate::extract::PdfRasterizer;
use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;

/// Resolution pages are rendered at for OCR.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// Upper bound on either side of a rendered page.
pub const MAX_DIMENSION_PX: u32 = 4096;

const POINTS_PER_INCH: f32 = 72.0;

/// Pixel size of a page rendered at `dpi`, each side clamped to
/// `1..=MAX_DIMENSION_PX` with the aspect ratio kept when capping.
pub fn render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

/// Rasterises scanned PDFs by extracting the page's embedded scan.
///
/// A page with no image XObject (text or vector drawing only) comes back as
/// a blank page of the right size: it reads as no text rather than failing
/// the document. Only unparseable PDFs are errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRasterizer;

impl PdfRasterizer for LopdfRasterizer {
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    fn rasterize_first_page(&self, pdf_bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let reader = PdfReader::from_bytes(pdf_bytes)?;
        if reader.page_count() == 0 {
            debug!("PDF has no pages");
            return Ok(None);
        }
        if let Some(png) = reader.page_image(1)? {
            return Ok(Some(png));
        }

        let (width_points, height_points) = reader.page_size(1)?;
        let (width, height) = render_dimensions(width_points, height_points, DEFAULT_RENDER_DPI);
        warn!(width, height, "first page has no embedded scan, rendering it blank");
        let blank = GrayImage::from_pixel(width, height, Luma([255]));
        ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(blank))
            .to_png_bytes()
            .map(Some)
    }
}
