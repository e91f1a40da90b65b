//! Message bundle coverage validation.
//!
//! Compares a locale's bundle against the default locale's bundle so
//! missing translations are reported at startup rather than discovered as
//! raw keys on a rendered page.

use crate::i18n::MessageBundle;
use serde_json::Value;
use std::collections::BTreeSet;

/// Validation report containing errors and warnings about a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys present in the reference bundle but missing from the candidate
    pub errors: Vec<String>,

    /// Extra keys and empty strings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BundleValidator;

impl BundleValidator {
    /// Validate `candidate` against `reference`.
    ///
    /// - every leaf key of `reference` must exist in `candidate` (error)
    /// - keys only in `candidate` are reported (warning)
    /// - empty string leaves in `candidate` are reported (warning)
    pub fn validate(reference: &MessageBundle, candidate: &MessageBundle) -> ValidationReport {
        let mut report = ValidationReport::new();

        let expected: BTreeSet<String> = reference.keys().into_iter().collect();
        let actual: BTreeSet<String> = candidate.keys().into_iter().collect();

        for key in expected.difference(&actual) {
            report.errors.push(format!("Missing key: {}", key));
        }

        for key in actual.difference(&expected) {
            report.warnings.push(format!("Unexpected key: {}", key));
        }

        for key in &actual {
            if let Some(Value::String(text)) = candidate.get(key) {
                if text.trim().is_empty() {
                    report.warnings.push(format!("Empty translation: {}", key));
                }
            }
        }

        report
    }
}
