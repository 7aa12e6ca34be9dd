// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PNG previews of matched documents.

use std::path::{Path, PathBuf};

use docsort_core::error::Result;
use docsort_core::types::{ClassificationResult, DocumentFormat};
use docsort_document::{ImageProcessor, PdfRasterizer, PdfiumRasterizer};
use tracing::{info, warn};

/// Longest side of a preview, in pixels.
const PREVIEW_MAX_SIDE: u32 = 800;

/// Write one preview per match into `dir`. Returns the paths written.
///
/// A PDF without pages has nothing to preview and is skipped.
pub fn write_previews(matches: &[ClassificationResult], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (index, result) in matches.iter().enumerate() {
        let Some(image_bytes) = preview_source(result)? else {
            warn!(document = %result.document_name, "Nothing to preview");
            continue;
        };

        let path = dir.join(preview_file_name(index, result));
        ImageProcessor::from_bytes(&image_bytes)?
            .fit_within(PREVIEW_MAX_SIDE, PREVIEW_MAX_SIDE)
            .save(&path)?;
        written.push(path);
    }

    info!(count = written.len(), dir = %dir.display(), "Previews written");
    Ok(written)
}

fn preview_source(result: &ClassificationResult) -> Result<Option<Vec<u8>>> {
    match result.format {
        DocumentFormat::Image => Ok(Some(result.bytes.clone())),
        DocumentFormat::Pdf => PdfiumRasterizer::new().rasterize_first_page(&result.bytes),
    }
}

/// `01-national_id-cni.png` style names, unique within one run.
fn preview_file_name(index: usize, result: &ClassificationResult) -> String {
    let stem = Path::new(&result.document_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{:02}-{}-{}.png", index + 1, result.category.key(), stem)
}

#[cfg(test)]
mod tests {
    use docsort_core::types::{Category, UploadedDocument};
    use image::DynamicImage;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        ImageProcessor::from_dynamic(DynamicImage::new_rgb8(width, height))
            .to_png_bytes()
            .unwrap()
    }

    #[test]
    fn previews_are_shrunk_and_named_by_category() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new("cni.png", png(1600, 1000), DocumentFormat::Image);
        let result = ClassificationResult::new(&doc, Category::NationalId);

        let written = write_previews(&[result], dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("01-national_id-cni.png")]);

        let preview = ImageProcessor::from_bytes(&std::fs::read(&written[0]).unwrap()).unwrap();
        assert_eq!((preview.width(), preview.height()), (800, 500));
    }

    #[test]
    fn broken_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new("bad.png", b"nope".to_vec(), DocumentFormat::Image);
        let result = ClassificationResult::new(&doc, Category::Passport);
        assert!(write_previews(&[result], dir.path()).is_err());
    }
}
