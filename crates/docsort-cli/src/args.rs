// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use docsort_core::config::SortConfig;
use docsort_core::types::{Category, IdentityQuery};

/// Sort scanned identity documents into official categories and check that
/// they belong to the expected person.
#[derive(Debug, Parser)]
#[command(name = "docsort", version, about)]
pub struct Args {
    /// Settings file (defaults to the user config directory).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// First name of the person the documents should belong to.
    #[arg(long, value_name = "NAME")]
    pub first_name: Option<String>,

    /// Last name of the person the documents should belong to.
    #[arg(long, value_name = "NAME")]
    pub last_name: Option<String>,

    /// Never report this category (repeatable): passport, national_id,
    /// residence_permit, proof_of_address, bank_statement.
    #[arg(long = "disable", value_name = "CATEGORY", value_parser = parse_category)]
    pub disabled: Vec<Category>,

    /// Directory holding the OCR model files.
    #[arg(long, value_name = "DIR")]
    pub models: Option<PathBuf>,

    /// Write a PNG preview of every matched document here.
    #[arg(long, value_name = "DIR")]
    pub preview_dir: Option<PathBuf>,

    /// Documents processed at once.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Print matches as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// PDF, JPEG, or PNG files to analyse.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Layer command-line overrides on top of the loaded settings.
    pub fn apply_to(&self, config: &mut SortConfig) {
        for category in &self.disabled {
            config.categories.set(*category, false);
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        if let Some(models) = &self.models {
            config.ocr_model_dir = Some(models.clone());
        }
    }

    pub fn identity(&self) -> IdentityQuery {
        IdentityQuery::new(
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        )
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_key(&value.replace('-', "_")).ok_or_else(|| {
        let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
        format!("unknown category `{value}` (expected one of: {})", keys.join(", "))
    })
}
