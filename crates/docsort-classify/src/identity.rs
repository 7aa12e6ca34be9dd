// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Identity verification — does the recognised text name the expected person?

use crate::normalize::normalize;

/// True when both names appear, after normalisation, as substrings of `text`.
///
/// No word boundaries are enforced: "ana" is found inside "banana".
pub fn verify_identity(text: &str, first_name: &str, last_name: &str) -> bool {
    NormalizedText::new(text).contains_names(first_name, last_name)
}

/// Text normalised once and reused for several identity checks.
pub(crate) struct NormalizedText(String);

impl NormalizedText {
    pub(crate) fn new(text: &str) -> Self {
        Self(normalize(text))
    }

    pub(crate) fn contains_names(&self, first_name: &str, last_name: &str) -> bool {
        self.0.contains(&normalize(first_name)) && self.0.contains(&normalize(last_name))
    }
}
