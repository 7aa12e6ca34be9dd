// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local `OcrService` backed by `ocrs` (neural text detection + recognition run
// through `rten`). Compiled only with the `ocr` feature.
//
// Two model files are expected side by side in one directory:
//   text-detection.rten, text-recognition.rten
// `ocrs-cli` downloads both into `$XDG_CACHE_HOME/ocrs` on first use, which is
// also where we look when no directory is configured.

use std::path::{Path, PathBuf};

use docsort_core::error::{DocsortError, Result};
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::extract::{OcrResponse, OcrService};
use crate::image::processor::ImageProcessor;

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, then `~/.cache/ocrs`, then `./ocrs-models`.
pub fn model_directory() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .map(|cache| cache.join("ocrs"))
        .unwrap_or_else(|| PathBuf::from("ocrs-models"))
}

/// Locations of the two model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(model_directory())
    }
}

impl OcrConfig {
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            detection_model_path: dir.as_ref().join(DETECTION_MODEL),
            recognition_model_path: dir.as_ref().join(RECOGNITION_MODEL),
        }
    }

    /// The configured directory, or [`model_directory`] when there is none.
    pub fn from_optional_dir(dir: Option<&Path>) -> Self {
        dir.map(Self::from_dir).unwrap_or_default()
    }

    /// Fails with `OcrError` naming the first missing file.
    pub fn validate(&self) -> Result<()> {
        let missing = [&self.detection_model_path, &self.recognition_model_path]
            .into_iter()
            .find(|path| !path.is_file());
        match missing {
            Some(path) => Err(DocsortError::OcrError(format!(
                "model file {} is missing (running `ocrs-cli` once downloads it)",
                path.display()
            ))),
            None => Ok(()),
        }
    }
}

fn load_model(path: &Path, role: &str) -> Result<Model> {
    info!(role, path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        DocsortError::OcrError(format!("cannot load {role} model {}: {err}", path.display()))
    })
}

/// Recognises the text of one page image at a time.
///
/// Loading the models dominates start-up, so one engine serves a whole batch.
/// Build `ocrs` and `rten` in release mode; debug builds are far too slow for
/// real scans.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    #[instrument(skip_all)]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(load_model(&config.detection_model_path, "detection")?),
            recognition_model: Some(load_model(&config.recognition_model_path, "recognition")?),
            ..Default::default()
        })
        .map_err(|err| DocsortError::OcrError(format!("cannot start OCR engine: {err}")))?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    /// All recognised lines, joined with `\n`.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn recognize_text(&self, page: &DynamicImage) -> Result<String> {
        let rgb = page.to_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|err| DocsortError::OcrError(format!("unusable page image: {err}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| DocsortError::OcrError(format!("preprocessing failed: {err}")))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| DocsortError::OcrError(format!("recognition failed: {err}")))?;

        debug!(lines = text.lines().count(), chars = text.chars().count(), "Page recognised");
        Ok(text)
    }
}

impl OcrService for OcrEngine {
    fn detect_text(&self, image_bytes: &[u8]) -> OcrResponse {
        let recognised = ImageProcessor::from_bytes(image_bytes)
            .and_then(|page| self.recognize_text(&page.into_dynamic()));
        match recognised {
            Ok(text) => OcrResponse::text(text),
            Err(err) => OcrResponse::failed(err.to_string()),
        }
    }
}
