// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Classifier — maps recognised text to at most one category.

use docsort_core::types::{Category, CategoryOptions, IdentityQuery};
use tracing::{debug, trace};

use crate::identity::NormalizedText;
use crate::rules::RULES;

/// Return the first enabled category whose body holds and whose identity
/// gate passes, or `None`.
///
/// With a complete `identity`, gated rules also require both names in the
/// text. With an incomplete one, keyword evidence alone decides.
pub fn classify(text: &str, options: &CategoryOptions, identity: &IdentityQuery) -> Option<Category> {
    let lowered = text.to_lowercase();
    let names = identity.names();
    // Identity is checked at most once, and only if some body holds.
    let mut identity_outcome: Option<bool> = None;

    for rule in &RULES {
        if !options.is_enabled(rule.category) || !rule.matches_body(&lowered) {
            continue;
        }

        if let (true, Some((first, last))) = (rule.identity_gated, names) {
            let present = *identity_outcome.get_or_insert_with(|| {
                NormalizedText::new(text).contains_names(first, last)
            });
            if !present {
                trace!(category = rule.category.key(), "Body matched, identity absent");
                continue;
            }
        }

        debug!(category = rule.category.key(), "Document classified");
        return Some(rule.category);
    }

    debug!("No category matched");
    None
}
