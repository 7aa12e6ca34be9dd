// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering batch outcomes for the terminal.

use docsort_classify::BatchOutcome;
use docsort_core::error::Result;
use docsort_core::human_errors::HumanError;
use docsort_core::types::{Category, ClassificationResult, IdentityQuery};
use serde::Serialize;

pub const NOTHING_FOUND: &str = "No official document found among the imported files.";

/// One line per match, e.g. `🪪 Carte d'identité de Marie Dupont — cni.jpg`.
pub fn render_text(outcome: &BatchOutcome, identity: &IdentityQuery) -> String {
    if outcome.is_empty() {
        return format!("{NOTHING_FOUND}\n");
    }

    let owner = identity.display_name();
    let mut out = String::new();
    for result in &outcome.matches {
        let category = result.category;
        if owner.is_empty() {
            out.push_str(&format!("{} {} — {}\n", category.emoji(), category.label(), result.document_name));
        } else {
            out.push_str(&format!(
                "{} {} de {} — {}\n",
                category.emoji(),
                category.label(),
                owner,
                result.document_name
            ));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    examined: usize,
    matches: Vec<JsonMatch<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonMatch<'a> {
    document: &'a str,
    category: Category,
    label: &'static str,
    fingerprint: &'a str,
    classified_at: String,
}

impl<'a> From<&'a ClassificationResult> for JsonMatch<'a> {
    fn from(result: &'a ClassificationResult) -> Self {
        Self {
            document: &result.document_name,
            category: result.category,
            label: result.category.label(),
            fingerprint: &result.fingerprint,
            classified_at: result.classified_at.to_rfc3339(),
        }
    }
}

/// Machine-readable form of the outcome.
pub fn render_json(outcome: &BatchOutcome) -> Result<String> {
    let report = JsonReport {
        examined: outcome.examined,
        matches: outcome.matches.iter().map(JsonMatch::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// `Error (<severity>): <message>` followed by the suggestion.
pub fn render_error(human: &HumanError) -> String {
    format!("Error ({}): {}\n{}\n", human.severity.label(), human.message, human.suggestion)
}
