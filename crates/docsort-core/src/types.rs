// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docsort document sorter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DocsortError, Result};

/// Unique identifier for an uploaded document within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// A raster image (JPEG, PNG) submitted to OCR as-is.
    Image,
    /// A PDF; only its first page is rasterised and recognised.
    Pdf,
}

impl DocumentFormat {
    /// Resolve the format from a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(Self::Pdf)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }

    /// Infer the format from a file extension (the upload form accepts PDF,
    /// JPEG, and PNG).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            _ => None,
        }
    }

    /// Best-effort MIME type for a file name, used when the caller has no
    /// declared type (e.g. files read from disk).
    pub fn mime_for_name(name: &str) -> &'static str {
        let ext = extension_of(name).unwrap_or_default().to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => "application/pdf",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }
}

fn extension_of(name: &str) -> Option<&str> {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
}

/// A document received from the operator. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub id: DocumentId,
    /// Display name (usually the original file name).
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            format,
            bytes,
        }
    }

    /// Build a document from a batch input tuple `(filename, bytes, mime)`.
    ///
    /// The declared MIME type wins; the file extension is the fallback.
    pub fn from_upload(name: impl Into<String>, bytes: Vec<u8>, declared_mime: &str) -> Result<Self> {
        let name = name.into();
        let format = DocumentFormat::from_mime(declared_mime)
            .or_else(|| extension_of(&name).and_then(DocumentFormat::from_extension))
            .ok_or_else(|| {
                DocsortError::UnsupportedDocument(format!("{name} ({declared_mime})"))
            })?;
        Ok(Self::new(name, bytes, format))
    }

    /// SHA-256 fingerprint of the raw bytes (lowercase hex).
    pub fn fingerprint(&self) -> String {
        crate::integrity::hash_bytes(&self.bytes)
    }
}

/// The official document categories, in rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Passport,
    NationalId,
    ResidencePermit,
    ProofOfAddress,
    BankStatement,
}

impl Category {
    /// Every category, in the order the classifier evaluates them.
    pub const ALL: [Category; 5] = [
        Category::Passport,
        Category::NationalId,
        Category::ResidencePermit,
        Category::ProofOfAddress,
        Category::BankStatement,
    ];

    /// Configuration key for this category.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::ResidencePermit => "residence_permit",
            Self::ProofOfAddress => "proof_of_address",
            Self::BankStatement => "bank_statement",
        }
    }

    /// Look a category up by its configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Label shown to operators.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passport => "Passeport",
            Self::NationalId => "Carte d'identité",
            Self::ResidencePermit => "Titre de séjour",
            Self::ProofOfAddress => "Justificatif de domicile",
            Self::BankStatement => "RIB",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Passport => "🛂",
            Self::NationalId => "🪪",
            Self::ResidencePermit => "📄",
            Self::ProofOfAddress => "🏠",
            Self::BankStatement => "💳",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn enabled() -> bool {
    true
}

/// Which categories the classifier may return. Missing keys default to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptions {
    #[serde(default = "enabled")]
    pub passport: bool,
    #[serde(default = "enabled")]
    pub national_id: bool,
    #[serde(default = "enabled")]
    pub residence_permit: bool,
    #[serde(default = "enabled")]
    pub proof_of_address: bool,
    #[serde(default = "enabled")]
    pub bank_statement: bool,
}

impl CategoryOptions {
    pub fn all_enabled() -> Self {
        Self {
            passport: true,
            national_id: true,
            residence_permit: true,
            proof_of_address: true,
            bank_statement: true,
        }
    }

    pub fn none_enabled() -> Self {
        Self {
            passport: false,
            national_id: false,
            residence_permit: false,
            proof_of_address: false,
            bank_statement: false,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Passport => self.passport,
            Category::NationalId => self.national_id,
            Category::ResidencePermit => self.residence_permit,
            Category::ProofOfAddress => self.proof_of_address,
            Category::BankStatement => self.bank_statement,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        let flag = match category {
            Category::Passport => &mut self.passport,
            Category::NationalId => &mut self.national_id,
            Category::ResidencePermit => &mut self.residence_permit,
            Category::ProofOfAddress => &mut self.proof_of_address,
            Category::BankStatement => &mut self.bank_statement,
        };
        *flag = enabled;
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, category: Category, enabled: bool) -> Self {
        self.set(category, enabled);
        self
    }
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self::all_enabled()
    }
}

/// The person a batch of documents is expected to belong to.
///
/// Names are trimmed on construction; a blank name is stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl IdentityQuery {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
        }
    }

    /// An empty query: classification runs without identity gating.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Both names, when both are present and non-blank.
    pub fn names(&self) -> Option<(&str, &str)> {
        let first = self.first_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let last = self.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((first, last))
    }

    pub fn is_complete(&self) -> bool {
        self.names().is_some()
    }

    /// "First Last" for display, or an empty string when incomplete.
    pub fn display_name(&self) -> String {
        self.names()
            .map(|(first, last)| format!("{first} {last}"))
            .unwrap_or_default()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A document that matched a category, paired with its source identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub document_id: DocumentId,
    pub document_name: String,
    pub format: DocumentFormat,
    pub category: Category,
    /// SHA-256 of the original document bytes.
    pub fingerprint: String,
    /// Raw document bytes, kept for previews. Not serialised.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub classified_at: DateTime<Utc>,
}

impl ClassificationResult {
    pub fn new(document: &UploadedDocument, category: Category) -> Self {
        Self {
            document_id: document.id,
            document_name: document.name.clone(),
            format: document.format,
            category,
            fingerprint: document.fingerprint(),
            bytes: document.bytes.clone(),
            classified_at: Utc::now(),
        }
    }
}
