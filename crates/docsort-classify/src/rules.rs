// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The category rule table.
//
// Rules are evaluated in table order and the first rule whose body and
// identity gate both hold wins. Rule bodies see lower-cased text only; accent
// folding is reserved for identity matching.

use docsort_core::types::Category;

/// "At least `threshold` distinct keywords from `keywords` appear."
///
/// A keyword counts once however many times it occurs.
#[derive(Debug, Clone, Copy)]
pub struct KeywordThreshold {
    pub keywords: &'static [&'static str],
    pub threshold: usize,
}

impl KeywordThreshold {
    /// Number of distinct keywords present in `lowered`.
    pub fn score(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lowered.contains(**keyword))
            .count()
    }

    pub fn is_met(&self, lowered: &str) -> bool {
        self.score(lowered) >= self.threshold
    }
}

/// The keyword predicate of a rule.
#[derive(Debug, Clone, Copy)]
pub enum RuleBody {
    /// Every group in `all_of` has at least one member present, and no word
    /// of `none_of` is present.
    Vocabulary {
        all_of: &'static [&'static [&'static str]],
        none_of: &'static [&'static str],
    },
    Threshold(KeywordThreshold),
}

impl RuleBody {
    /// Evaluate against text that has already been lower-cased.
    pub fn matches(&self, lowered: &str) -> bool {
        match self {
            RuleBody::Vocabulary { all_of, none_of } => {
                all_of
                    .iter()
                    .all(|group| group.iter().any(|word| lowered.contains(word)))
                    && !none_of.iter().any(|word| lowered.contains(word))
            }
            RuleBody::Threshold(threshold) => threshold.is_met(lowered),
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub body: RuleBody,
    /// Whether a complete identity query must also be found in the text.
    pub identity_gated: bool,
}

impl CategoryRule {
    pub fn matches_body(&self, lowered: &str) -> bool {
        self.body.matches(lowered)
    }
}

/// Words that mark a residence permit. Their presence vetoes the passport rule.
const RESIDENCE_PERMIT_MARKERS: &[&str] = &["titre", "séjour", "sejour"];

const RESIDENCE_PERMIT_KEYWORDS: &[&str] =
    &["résidence", "permit", "residence", "titre", "sejour", "séjour"];

const PROOF_OF_ADDRESS_KEYWORDS: &[&str] = &[
    "justificatif de domicile",
    "adresse",
    "nom du titulaire",
    "domicile",
    "quittance de loyer",
    "facture",
    "facture d'électricité",
    "facture edf",
    "facture engie",
    "facture gdf",
    "facture d'eau",
    "suez",
    "veolia",
    "facture de gaz",
    "attestation d'hébergement",
    "assurance habitation",
    "bail",
    "contrat de location",
    "date d’émission",
    "avis d'échéance",
    "quittance",
    "loyer",
    "loyers",
    "montants",
    "avis d'echeance",
];

const BANK_STATEMENT_KEYWORDS: &[&str] = &[
    "relevé d'identité bancaire",
    "rib",
    "iban",
    "bic",
    "code banque",
    "code guichet",
    "numéro de compte",
    "clé rib",
    "titulaire du compte",
    "nom de la banque",
];

/// All rules, in priority order.
pub static RULES: [CategoryRule; 5] = [
    CategoryRule {
        category: Category::Passport,
        body: RuleBody::Vocabulary {
            all_of: &[&["passeport"]],
            none_of: RESIDENCE_PERMIT_MARKERS,
        },
        identity_gated: true,
    },
    CategoryRule {
        category: Category::NationalId,
        body: RuleBody::Vocabulary {
            all_of: &[
                &["république", "republique"],
                &["française", "francaise"],
                &["carte", "identité", "identite"],
            ],
            none_of: &[],
        },
        identity_gated: true,
    },
    CategoryRule {
        category: Category::ResidencePermit,
        body: RuleBody::Threshold(KeywordThreshold {
            keywords: RESIDENCE_PERMIT_KEYWORDS,
            threshold: 2,
        }),
        identity_gated: true,
    },
    CategoryRule {
        category: Category::ProofOfAddress,
        body: RuleBody::Threshold(KeywordThreshold {
            keywords: PROOF_OF_ADDRESS_KEYWORDS,
            threshold: 2,
        }),
        identity_gated: true,
    },
    CategoryRule {
        category: Category::BankStatement,
        body: RuleBody::Threshold(KeywordThreshold {
            keywords: BANK_STATEMENT_KEYWORDS,
            threshold: 2,
        }),
        identity_gated: true,
    },
];

/// The rule for `category`.
pub fn rule_for(category: Category) -> Option<&'static CategoryRule> {
    RULES.iter().find(|rule| rule.category == category)
}
