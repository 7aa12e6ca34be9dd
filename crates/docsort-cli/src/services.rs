// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — loads settings and files, builds the OCR-backed runner.

use std::path::{Path, PathBuf};

use docsort_classify::BatchRequest;
use docsort_core::config::{SortConfig, default_config_path};
use docsort_core::error::Result;
use docsort_core::types::{CategoryOptions, DocumentFormat, IdentityQuery};
use tracing::{debug, info};

/// Load the settings file, or defaults when it does not exist yet.
pub fn load_config(path: Option<&Path>) -> Result<SortConfig> {
    let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = SortConfig::load_or_default(&path)?;
    info!(path = %path.display(), "Settings loaded");
    Ok(config)
}

/// Read every file from disk into a batch request. The MIME type is
/// inferred from the file extension.
pub fn read_batch(files: &[PathBuf], options: CategoryOptions, identity: IdentityQuery) -> Result<BatchRequest> {
    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        let bytes = std::fs::read(path)?;
        let name = display_name(path);
        let mime = DocumentFormat::mime_for_name(&name).to_string();
        debug!(file = %name, bytes = bytes.len(), "File read");
        uploads.push((name, bytes, mime));
    }
    BatchRequest::from_uploads(uploads, options, identity)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(feature = "ocr")]
pub mod engine {
    use docsort_classify::BatchRunner;
    use docsort_core::config::SortConfig;
    use docsort_core::error::Result;
    use docsort_document::scan::ocr::OcrConfig;
    use docsort_document::{OcrEngine, PdfiumRasterizer, TextExtractor};
    use tracing::{info, warn};

    /// A runner backed by the local `ocrs` engine and PDFium page rendering.
    pub fn build_runner(config: &SortConfig) -> Result<BatchRunner<OcrEngine, PdfiumRasterizer>> {
        let engine = OcrEngine::new(OcrConfig::from_optional_dir(config.ocr_model_dir.as_deref()))?;
        if PdfiumRasterizer::pdfium_available() {
            info!("PDF pages rendered with PDFium");
        } else {
            warn!("PDFium not found; PDF pages without an embedded scan will read as blank");
        }
        Ok(BatchRunner::from_config(TextExtractor::new(engine, PdfiumRasterizer::new()), config))
    }
}
