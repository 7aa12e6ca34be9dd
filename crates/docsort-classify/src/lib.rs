// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsort-classify — Deciding which official category a document belongs to,
// and whether it belongs to the expected person.

pub mod batch;
pub mod classifier;
pub mod identity;
pub mod normalize;
pub mod rules;

pub use batch::{BatchOutcome, BatchRequest, BatchRunner, check_preconditions};
pub use classifier::classify;
pub use identity::verify_identity;
pub use normalize::normalize;
pub use rules::{CategoryRule, KeywordThreshold, RULES, RuleBody, rule_for};
