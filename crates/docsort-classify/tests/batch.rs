// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end batch tests with a scripted OCR backend and real in-memory PDFs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use docsort_classify::{BatchOutcome, BatchRequest, BatchRunner};
use docsort_core::DocsortError;
use docsort_core::types::{Category, CategoryOptions, DocumentFormat, IdentityQuery, UploadedDocument};
use docsort_document::{LopdfRasterizer, OcrResponse, OcrService, PdfiumRasterizer, TextExtractor};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

// ---------------------------------------------------------------------------
// Fakes and fixtures
// ---------------------------------------------------------------------------

/// Image uploads carry their "recognised text" as raw bytes; decoded PDF
/// pages are looked up by pixel width. Bytes starting with `ERR` fail.
#[derive(Clone, Default)]
struct ScriptedOcr {
    pages_by_width: Vec<(u32, &'static str)>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedOcr {
    fn with_page(mut self, width: u32, text: &'static str) -> Self {
        self.pages_by_width.push((width, text));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrService for ScriptedOcr {
    fn detect_text(&self, image_bytes: &[u8]) -> OcrResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Ok(page) = image::load_from_memory(image_bytes) {
            return self
                .pages_by_width
                .iter()
                .find(|(width, _)| *width == page.width())
                .map(|(_, text)| OcrResponse::text(*text))
                .unwrap_or_default();
        }

        let text = String::from_utf8_lossy(image_bytes).into_owned();
        if let Some(delay) = self.delay {
            // Longer texts return sooner, so completion order differs from input order.
            std::thread::sleep(delay / (text.len() as u32).max(1));
        }
        if text.starts_with("ERR") {
            return OcrResponse::failed("quota exceeded");
        }
        OcrResponse::text(text)
    }
}

fn runner(ocr: &ScriptedOcr) -> BatchRunner<ScriptedOcr, LopdfRasterizer> {
    BatchRunner::new(TextExtractor::new(ocr.clone(), LopdfRasterizer))
}

fn image(name: &str, text: &str) -> UploadedDocument {
    UploadedDocument::new(name, text.as_bytes().to_vec(), DocumentFormat::Image)
}

fn pdf(name: &str, bytes: Vec<u8>) -> UploadedDocument {
    UploadedDocument::new(name, bytes, DocumentFormat::Pdf)
}

/// A PDF whose pages each carry one grayscale scan of the given width.
fn scanned_pdf(page_widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for &width in page_widths {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => 4,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![180u8; (width * 4) as usize],
        ));
        let contents_id = doc.add_object(Stream::new(Dictionary::new(), b"/Im0 Do".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => contents_id,
            "Resources" => dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// A one-page PDF drawn with a text operator only, no embedded scan.
fn text_only_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let contents_id = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET").into_bytes(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => contents_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

fn categories(outcome: &BatchOutcome) -> Vec<(&str, Category)> {
    outcome
        .matches
        .iter()
        .map(|result| (result.document_name.as_str(), result.category))
        .collect()
}

fn marie() -> IdentityQuery {
    IdentityQuery::new("Marie", "Dupont")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn national_id_card_is_recognised() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("cni.jpg", "REPUBLIQUE FRANCAISE CARTE NATIONALE D'IDENTITE Marie Dupont")],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&outcome), vec![("cni.jpg", Category::NationalId)]);
}

#[test]
fn passport_takes_priority_over_national_id() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("passport.png", "PASSEPORT REPUBLIQUE FRANCAISE Jean Martin")],
        CategoryOptions::all_enabled(),
        IdentityQuery::new("Jean", "Martin"),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&outcome), vec![("passport.png", Category::Passport)]);
}

#[test]
fn residence_permit_without_passport_word() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("titre.png", "TITRE DE SÉJOUR - RÉSIDENCE - MARIE DUPONT")],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&outcome), vec![("titre.png", Category::ResidencePermit)]);
}

#[test]
fn ocr_error_means_no_category_not_failure() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(vec![image("blurry.png", "ERR")], CategoryOptions::all_enabled(), marie());

    let outcome = runner(&ocr).run(&request).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.examined, 1);
}

#[test]
fn partial_identity_blocks_every_category() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![
            image("passport.png", "PASSEPORT Paul"),
            image("rib.png", "IBAN FR76 BIC AGRIFRPP Paul"),
            image("edf.png", "Facture EDF adresse Paul"),
        ],
        CategoryOptions::all_enabled(),
        IdentityQuery::new("Paul", "Durand"),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.examined, 3);
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[test]
fn preconditions_fail_before_any_ocr_call() {
    let ocr = ScriptedOcr::default();
    let runner = runner(&ocr);

    let empty = BatchRequest::new(vec![], CategoryOptions::all_enabled(), marie());
    assert!(matches!(runner.run(&empty), Err(DocsortError::NoDocuments)));

    let nameless = BatchRequest::new(
        vec![image("rib.png", "IBAN BIC")],
        CategoryOptions::all_enabled(),
        IdentityQuery::new("  ", "Dupont"),
    );
    assert!(matches!(runner.run(&nameless), Err(DocsortError::MissingIdentity)));

    assert_eq!(ocr.calls(), 0);
}

#[test]
fn names_are_trimmed_before_matching() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("rib.png", "IBAN BIC MARIE DUPONT")],
        CategoryOptions::all_enabled(),
        IdentityQuery::new("  Marie ", "\tDupont\n"),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&outcome), vec![("rib.png", Category::BankStatement)]);
}

#[test]
fn disabled_categories_are_never_returned() {
    let ocr = ScriptedOcr::default();
    let options = CategoryOptions::all_enabled().with(Category::BankStatement, false);
    let request = BatchRequest::new(vec![image("rib.png", "IBAN BIC Marie Dupont")], options, marie());

    let outcome = runner(&ocr).run(&request).unwrap();
    assert!(outcome.is_empty());
}

// ---------------------------------------------------------------------------
// PDFs
// ---------------------------------------------------------------------------

#[test]
fn only_the_first_pdf_page_is_recognised() {
    let ocr = ScriptedOcr::default()
        .with_page(30, "Quittance de loyer - adresse - Marie Dupont")
        .with_page(50, "IBAN BIC Marie Dupont");
    let request = BatchRequest::new(
        vec![pdf("quittance.pdf", scanned_pdf(&[30, 50]))],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&outcome), vec![("quittance.pdf", Category::ProofOfAddress)]);
    assert_eq!(ocr.calls(), 1);
}

#[test]
fn pdf_without_pages_is_not_an_error() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(vec![pdf("blank.pdf", scanned_pdf(&[]))], CategoryOptions::all_enabled(), marie());

    let outcome = runner(&ocr).run(&request).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(ocr.calls(), 0);
}

#[test]
fn text_only_pdf_does_not_fail_the_batch() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![
            image("cni.png", "REPUBLIQUE FRANCAISE CARTE NATIONALE D'IDENTITE Marie Dupont"),
            pdf("rib.pdf", text_only_pdf("RELEVE D'IDENTITE BANCAIRE IBAN BIC")),
        ],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let lopdf_outcome = runner(&ocr).run(&request).unwrap();
    assert_eq!(categories(&lopdf_outcome), vec![("cni.png", Category::NationalId)]);
    assert_eq!(lopdf_outcome.examined, 2);
    assert_eq!(ocr.calls(), 2);

    let pdfium_runner = BatchRunner::new(TextExtractor::new(ocr.clone(), PdfiumRasterizer::new()));
    let pdfium_outcome = pdfium_runner.run(&request).unwrap();
    assert_eq!(categories(&pdfium_outcome), vec![("cni.png", Category::NationalId)]);
    assert_eq!(ocr.calls(), 4);
}

#[test]
fn malformed_pdf_fails_the_batch() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("rib.png", "IBAN BIC Marie Dupont"), pdf("broken.pdf", b"definitely not a pdf".to_vec())],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let err = runner(&ocr).run(&request).unwrap_err();
    assert!(matches!(err, DocsortError::PdfError(_)));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

fn mixed_batch() -> BatchRequest {
    BatchRequest::new(
        vec![
            image("1-holiday.png", "Plage et soleil"),
            image("2-cni.png", "RÉPUBLIQUE FRANÇAISE CARTE D'IDENTITÉ MARÏE DÛPONT"),
            image("3-rib.png", "Relevé d'identité bancaire IBAN BIC Marie Dupont"),
            image("4-blurry.png", "ERR"),
            image("5-passport.png", "PASSEPORT Marie Dupont"),
            pdf("6-bail.pdf", scanned_pdf(&[64])),
            image("7-other.png", "PASSEPORT Jean Martin"),
        ],
        CategoryOptions::all_enabled(),
        marie(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_run_matches_sequential_run() {
    let ocr = ScriptedOcr {
        delay: Some(Duration::from_millis(40)),
        ..ScriptedOcr::default()
    }
    .with_page(64, "Contrat de location - bail - Marie Dupont");
    let runner = runner(&ocr).with_max_workers(3);

    let sequential = runner.run(&mixed_batch()).unwrap();
    let concurrent = runner.run_concurrent(mixed_batch()).await.unwrap();

    let expected = vec![
        ("2-cni.png", Category::NationalId),
        ("3-rib.png", Category::BankStatement),
        ("5-passport.png", Category::Passport),
        ("6-bail.pdf", Category::ProofOfAddress),
    ];
    assert_eq!(categories(&sequential), expected);
    assert_eq!(categories(&concurrent), expected);
    assert_eq!(concurrent.examined, 7);
}

#[tokio::test]
async fn concurrent_run_checks_preconditions_first() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![image("rib.png", "IBAN BIC")],
        CategoryOptions::all_enabled(),
        IdentityQuery::anonymous(),
    );

    let err = runner(&ocr).run_concurrent(request).await.unwrap_err();
    assert!(matches!(err, DocsortError::MissingIdentity));
    assert_eq!(ocr.calls(), 0);
}

#[tokio::test]
async fn concurrent_run_propagates_rasterization_failure() {
    let ocr = ScriptedOcr::default();
    let request = BatchRequest::new(
        vec![pdf("broken.pdf", b"not a pdf".to_vec()), image("rib.png", "IBAN BIC Marie Dupont")],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let err = runner(&ocr).run_concurrent(request).await.unwrap_err();
    assert!(matches!(err, DocsortError::PdfError(_)));
}

#[tokio::test]
async fn single_worker_still_completes() {
    let ocr = ScriptedOcr::default();
    let runner = runner(&ocr).with_max_workers(1);
    let request = BatchRequest::new(
        vec![image("a.png", "IBAN BIC Marie Dupont"), image("b.png", "PASSEPORT Marie Dupont")],
        CategoryOptions::all_enabled(),
        marie(),
    );

    let outcome = runner.run_concurrent(request).await.unwrap();
    assert_eq!(
        categories(&outcome),
        vec![("a.png", Category::BankStatement), ("b.png", Category::Passport)]
    );
    assert_eq!(ocr.calls(), 2);
}
