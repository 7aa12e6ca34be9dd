// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runner — a list of uploads in, the matched subset out.
//
// Preconditions are checked before any document reaches OCR. Documents are
// independent of each other, so the concurrent mode only changes throughput:
// matches come back in input order and the first failing document (in input
// order) decides the error, exactly as in the sequential mode.

use std::sync::Arc;

use docsort_core::config::SortConfig;
use docsort_core::error::{DocsortError, Result};
use docsort_core::types::{CategoryOptions, ClassificationResult, IdentityQuery, UploadedDocument};
use docsort_document::{OcrService, PdfRasterizer, TextExtractor};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use crate::classifier::classify;

/// One batch: the documents plus the options and identity shared by all.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub documents: Vec<UploadedDocument>,
    pub options: CategoryOptions,
    pub identity: IdentityQuery,
}

impl BatchRequest {
    pub fn new(documents: Vec<UploadedDocument>, options: CategoryOptions, identity: IdentityQuery) -> Self {
        Self {
            documents,
            options,
            identity,
        }
    }

    /// Build a request from `(filename, bytes, declared MIME type)` tuples.
    ///
    /// Fails on the first upload whose format is neither PDF nor image.
    pub fn from_uploads<I, N>(uploads: I, options: CategoryOptions, identity: IdentityQuery) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Vec<u8>, String)>,
        N: Into<String>,
    {
        let documents = uploads
            .into_iter()
            .map(|(name, bytes, mime)| UploadedDocument::from_upload(name, bytes, &mime))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(documents, options, identity))
    }
}

/// The matched subset of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One entry per matched document, in input order.
    pub matches: Vec<ClassificationResult>,
    /// How many documents were processed.
    pub examined: usize,
}

impl BatchOutcome {
    /// No document matched any enabled category.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Runs batches through a shared [`TextExtractor`] and the classifier.
pub struct BatchRunner<O, R> {
    extractor: Arc<TextExtractor<O, R>>,
    require_identity: bool,
    max_workers: usize,
}

impl<O: OcrService, R: PdfRasterizer> BatchRunner<O, R> {
    pub fn new(extractor: TextExtractor<O, R>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            require_identity: true,
            max_workers: 4,
        }
    }

    /// Take `require_identity` and `max_workers` from a loaded config.
    pub fn from_config(extractor: TextExtractor<O, R>, config: &SortConfig) -> Self {
        Self::new(extractor)
            .with_require_identity(config.require_identity)
            .with_max_workers(config.max_workers)
    }

    pub fn with_require_identity(mut self, require_identity: bool) -> Self {
        self.require_identity = require_identity;
        self
    }

    /// Zero is treated as one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Reject a batch that cannot be processed, before any OCR happens.
    pub fn check_preconditions(&self, request: &BatchRequest) -> Result<()> {
        check_preconditions(request, self.require_identity)
    }

    /// Extract and classify one document. `Ok(None)` means "no category".
    pub fn classify_document(
        &self,
        document: &UploadedDocument,
        options: &CategoryOptions,
        identity: &IdentityQuery,
    ) -> Result<Option<ClassificationResult>> {
        classify_with(&self.extractor, document, options, identity)
    }

    /// Process every document in input order on the calling thread.
    #[instrument(skip_all, fields(documents = request.documents.len()))]
    pub fn run(&self, request: &BatchRequest) -> Result<BatchOutcome> {
        self.check_preconditions(request)?;
        info!("Starting batch");

        let mut matches = Vec::new();
        for document in &request.documents {
            if let Some(result) = self.classify_document(document, &request.options, &request.identity)? {
                matches.push(result);
            }
        }

        let outcome = BatchOutcome {
            matches,
            examined: request.documents.len(),
        };
        info!(matched = outcome.matches.len(), examined = outcome.examined, "Batch complete");
        Ok(outcome)
    }
}

impl<O, R> BatchRunner<O, R>
where
    O: OcrService + 'static,
    R: PdfRasterizer + 'static,
{
    /// Process documents on blocking worker tasks, at most `max_workers` at
    /// a time. Same outcome as [`BatchRunner::run`].
    #[instrument(skip_all, fields(documents = request.documents.len(), workers = self.max_workers))]
    pub async fn run_concurrent(&self, request: BatchRequest) -> Result<BatchOutcome> {
        self.check_preconditions(&request)?;
        info!("Starting concurrent batch");

        let examined = request.documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let options = Arc::new(request.options);
        let identity = Arc::new(request.identity);

        let mut tasks = JoinSet::new();
        for (index, document) in request.documents.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|err| DocsortError::Worker(err.to_string()))?;
            let extractor = Arc::clone(&self.extractor);
            let options = Arc::clone(&options);
            let identity = Arc::clone(&identity);

            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, classify_with(&extractor, &document, &options, &identity))
            });
        }

        let mut slots: Vec<Option<Result<Option<ClassificationResult>>>> =
            std::iter::repeat_with(|| None).take(examined).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|err| DocsortError::Worker(err.to_string()))?;
            slots[index] = Some(outcome);
        }

        let mut matches = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(Some(result))) => matches.push(result),
                Some(Ok(None)) => {}
                Some(Err(err)) => return Err(err),
                None => {
                    return Err(DocsortError::Worker(format!("document #{index} was never processed")));
                }
            }
        }

        let outcome = BatchOutcome { matches, examined };
        info!(matched = outcome.matches.len(), examined = outcome.examined, "Batch complete");
        Ok(outcome)
    }
}

/// A batch needs at least one document, and both names when
/// `require_identity` is set.
pub fn check_preconditions(request: &BatchRequest, require_identity: bool) -> Result<()> {
    if request.documents.is_empty() {
        return Err(DocsortError::NoDocuments);
    }
    if require_identity && !request.identity.is_complete() {
        return Err(DocsortError::MissingIdentity);
    }
    Ok(())
}

fn classify_with<O: OcrService, R: PdfRasterizer>(
    extractor: &TextExtractor<O, R>,
    document: &UploadedDocument,
    options: &CategoryOptions,
    identity: &IdentityQuery,
) -> Result<Option<ClassificationResult>> {
    let text = extractor.extract_text(document).inspect_err(|err| {
        error!(document = %document.name, %err, "Document could not be read");
    })?;

    let category = classify(&text, options, identity);
    debug!(document = %document.name, category = ?category.map(|c| c.key()), "Document processed");
    Ok(category.map(|category| ClassificationResult::new(document, category)))
}

#[cfg(test)]
mod tests {
    use docsort_core::types::{Category, DocumentFormat};
    use docsort_document::{LopdfRasterizer, OcrResponse};

    use super::*;

    /// Echoes the submitted bytes back as text.
    struct EchoOcr;

    impl OcrService for EchoOcr {
        fn detect_text(&self, image_bytes: &[u8]) -> OcrResponse {
            OcrResponse::text(String::from_utf8_lossy(image_bytes).into_owned())
        }
    }

    fn runner() -> BatchRunner<EchoOcr, LopdfRasterizer> {
        BatchRunner::new(TextExtractor::new(EchoOcr, LopdfRasterizer))
    }

    fn image(name: &str, text: &str) -> UploadedDocument {
        UploadedDocument::new(name, text.as_bytes().to_vec(), DocumentFormat::Image)
    }

    #[test]
    fn empty_batch_is_rejected() {
        let request = BatchRequest::new(vec![], CategoryOptions::default(), IdentityQuery::new("A", "B"));
        assert!(matches!(runner().run(&request), Err(DocsortError::NoDocuments)));
    }

    #[test]
    fn identity_required_by_default() {
        let request = BatchRequest::new(
            vec![image("a.png", "IBAN BIC")],
            CategoryOptions::default(),
            IdentityQuery::new("Marie", " "),
        );
        assert!(matches!(runner().run(&request), Err(DocsortError::MissingIdentity)));
    }

    #[test]
    fn identity_optional_when_configured() {
        let request = BatchRequest::new(
            vec![image("a.png", "IBAN BIC")],
            CategoryOptions::default(),
            IdentityQuery::anonymous(),
        );
        let outcome = runner().with_require_identity(false).run(&request).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].category, Category::BankStatement);
    }

    #[test]
    fn unmatched_documents_are_omitted() {
        let request = BatchRequest::new(
            vec![image("holiday.png", "Plage"), image("rib.png", "IBAN BIC Marie Dupont")],
            CategoryOptions::default(),
            IdentityQuery::new("Marie", "Dupont"),
        );
        let outcome = runner().run(&request).unwrap();
        assert_eq!(outcome.examined, 2);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].document_name, "rib.png");
    }

    #[test]
    fn config_sets_runner_limits() {
        let config = SortConfig {
            require_identity: false,
            max_workers: 0,
            ..SortConfig::default()
        };
        let runner = BatchRunner::from_config(TextExtractor::new(EchoOcr, LopdfRasterizer), &config);
        assert_eq!(runner.max_workers(), 1);
        assert!(!runner.require_identity);
    }

    #[test]
    fn uploads_with_unknown_format_are_rejected() {
        let uploads = vec![("notes.docx", vec![1, 2, 3], "application/msword".to_string())];
        let err = BatchRequest::from_uploads(uploads, CategoryOptions::default(), IdentityQuery::anonymous())
            .unwrap_err();
        assert!(matches!(err, DocsortError::UnsupportedDocument(_)));
    }

    #[test]
    fn uploads_fall_back_to_extension() {
        let uploads = vec![("scan.JPG", vec![1], "application/octet-stream".to_string())];
        let request =
            BatchRequest::from_uploads(uploads, CategoryOptions::default(), IdentityQuery::anonymous()).unwrap();
        assert_eq!(request.documents[0].format, DocumentFormat::Image);
    }
}
