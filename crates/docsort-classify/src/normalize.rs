// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text normalisation for accent-insensitive comparisons.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decompose (NFKD), drop combining marks, and lower-case.
///
/// Lower-casing can produce new decomposable sequences (`İ` becomes `i̇`), so
/// marks are stripped again afterwards. The result is a fixed point:
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = strip_marks(text).to_lowercase();
    strip_marks(&lowered)
}

fn strip_marks(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_fold_together() {
        assert_eq!(normalize("Évian"), normalize("evian"));
        assert_eq!(normalize("MARÏE DÛPONT"), "marie dupont");
        assert_eq!(normalize("République Française"), "republique francaise");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Évian",
            "İstanbul",
            "ﬁche de paie",
            "Ǆemal",
            "ᴬBC",
            "Ångström ÇA",
            "d’émission",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn compatibility_ligatures_expand() {
        assert_eq!(normalize("ﬁche"), "fiche");
    }

    #[test]
    fn dotted_capital_i_loses_its_dot() {
        assert_eq!(normalize("İ"), "i");
    }
}
