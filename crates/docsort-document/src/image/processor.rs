// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory page images: decoding uploads, bounding their size for previews,
// and PNG encoding for the OCR service.

use std::path::Path;

use docsort_core::error::{DocsortError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

/// One decoded image. Steps consume `self` so they chain:
///
/// ```ignore
/// ImageProcessor::from_bytes(&scan)?.fit_within(800, 800).save("preview.png")?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    /// Decode JPEG, PNG, or any other format `image` can sniff.
    #[instrument(skip_all, fields(bytes = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| DocsortError::ImageError(format!("cannot decode image: {err}")))?;
        debug!(width = image.width(), height = image.height(), "Image decoded");
        Ok(Self { image })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Scale down, keeping the aspect ratio, until both sides fit. Never
    /// scales up.
    pub fn fit_within(self, max_width: u32, max_height: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width <= max_width && height <= max_height {
            return self;
        }
        let image = self.image.resize(max_width, max_height, FilterType::Lanczos3);
        debug!(from = ?(width, height), to = ?(image.width(), image.height()), "Image shrunk");
        Self { image }
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut png = std::io::Cursor::new(Vec::new());
        self.image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|err| DocsortError::ImageError(format!("cannot encode PNG: {err}")))?;
        Ok(png.into_inner())
    }

    /// Write as PNG, whatever the extension of `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_png_bytes()?)?;
        Ok(())
    }
}
