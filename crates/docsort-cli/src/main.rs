// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsort — Sort scanned identity documents into official categories from
// the command line.

mod args;
mod preview;
mod report;
mod services;

use std::process::ExitCode;

use clap::Parser;
use docsort_core::error::Result;
use docsort_core::human_errors::humanize_error;
use tracing::{error, info};

use crate::args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Docsort starting");

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Docsort failed");
            eprint!("{}", report::render_error(&humanize_error(&err)));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = services::load_config(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    let identity = args.identity();
    let request = services::read_batch(&args.files, config.categories, identity.clone())?;
    // Reject an empty or nameless batch before loading the OCR models.
    docsort_classify::check_preconditions(&request, config.require_identity)?;

    let outcome = classify_batch(&config, request).await?;

    if let Some(dir) = &args.preview_dir {
        preview::write_previews(&outcome.matches, dir)?;
    }

    let rendered = if args.json {
        report::render_json(&outcome)?
    } else {
        report::render_text(&outcome, &identity)
    };
    print!("{rendered}");
    if args.json {
        println!();
    }

    info!(matched = outcome.matches.len(), examined = outcome.examined, "Done");
    Ok(())
}

#[cfg(feature = "ocr")]
async fn classify_batch(
    config: &docsort_core::SortConfig,
    request: docsort_classify::BatchRequest,
) -> Result<docsort_classify::BatchOutcome> {
    let runner = services::engine::build_runner(config)?;
    runner.run_concurrent(request).await
}

#[cfg(not(feature = "ocr"))]
async fn classify_batch(
    _config: &docsort_core::SortConfig,
    _request: docsort_classify::BatchRequest,
) -> Result<docsort_classify::BatchOutcome> {
    Err(docsort_core::DocsortError::OcrError(
        "no OCR backend compiled in; rebuild with `--features ocr`".into(),
    ))
}
