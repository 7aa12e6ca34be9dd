// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error messages for operators.
//
// Every technical error is mapped to a short message and a concrete next step.
// The severity drives how the presentation layer shows it.

use crate::error::DocsortError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or engine problem — trying again may help.
    Transient,
    /// The operator must supply something (files, names, settings).
    ActionRequired,
    /// The input itself cannot be processed.
    Permanent,
}

impl Severity {
    /// Short tag shown in front of the message.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Transient => "temporary problem",
            Severity::ActionRequired => "action needed",
            Severity::Permanent => "cannot be processed",
        }
    }
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the operator should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `DocsortError` into a `HumanError`.
pub fn humanize_error(err: &DocsortError) -> HumanError {
    match err {
        DocsortError::NoDocuments => HumanError {
            message: "No files were imported.".into(),
            suggestion: "Please import at least one PDF or image file, then start the analysis again.".into(),
            severity: Severity::ActionRequired,
        },

        DocsortError::MissingIdentity => HumanError {
            message: "The person's name is missing.".into(),
            suggestion: "Please enter both the first name and the last name before starting the analysis.".into(),
            severity: Severity::ActionRequired,
        },

        DocsortError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Only PDF, JPEG, and PNG files can be analysed. ({detail})"),
            severity: Severity::Permanent,
        },

        DocsortError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or password-protected. Try exporting it again, or upload a photo of the first page instead.".into(),
            severity: Severity::Permanent,
        },

        DocsortError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        DocsortError::OcrError(_) => HumanError {
            message: "Text recognition isn't available.".into(),
            suggestion: "The text recognition models could not be loaded. Check the model directory in the settings, then try again.".into(),
            severity: Severity::Transient,
        },

        DocsortError::Worker(_) => HumanError {
            message: "The analysis stopped unexpectedly.".into(),
            suggestion: "Try running the analysis again. If this keeps happening, process fewer files at once.".into(),
            severity: Severity::Transient,
        },

        DocsortError::Config(detail) => HumanError {
            message: "The settings file isn't valid.".into(),
            suggestion: format!("Fix the settings file or delete it to restore the defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        DocsortError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to read that file.".into(),
                suggestion: "Check the file permissions, or copy the file to a different location first.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                severity: Severity::Transient,
            },
        },

        DocsortError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If the settings file was edited by hand, check that it is valid JSON.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
