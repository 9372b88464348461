//! Failure Reporter
//!
//! Turns raw violations into human-readable reasons such as
//! `property1 should be string` or `object should match some schema in anyOf`.
//! Reasons keep the order the validator emitted them in (schema declaration
//! order, composition summaries right after their branches) and are
//! deduplicated on first occurrence.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::validator::{Violation, ViolationKind};

/// Result of checking one value against one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub reasons: Vec<String>,
}

impl ValidationOutcome {
    pub fn passed() -> Self {
        Self {
            valid: true,
            reasons: Vec::new(),
        }
    }

    /// `valid` exactly when there is nothing to report
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }

    /// Reasons joined into one line
    pub fn describe(&self, separator: &str) -> String {
        self.reasons.join(separator)
    }
}

/// Formats violations into reasons
#[derive(Debug, Default, Clone, Copy)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn outcome(&self, violations: &[Violation]) -> ValidationOutcome {
        ValidationOutcome::from_reasons(self.report(violations))
    }

    /// Ordered, deduplicated reasons
    pub fn report(&self, violations: &[Violation]) -> Vec<String> {
        let mut seen = HashSet::with_capacity(violations.len());
        violations
            .iter()
            .map(|v| self.reason(v))
            .filter(|reason| seen.insert(reason.clone()))
            .collect()
    }

    /// `<path> <expectation>`, with `object` standing in for the root
    pub fn reason(&self, violation: &Violation) -> String {
        format!("{} {}", violation.path, expectation(&violation.kind))
    }
}

/// The "should ..." part of a reason
pub fn expectation(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::Type { expected } => format!("should be {}", expected.join(",")),
        ViolationKind::Required { property } => {
            format!("should have required property '{}'", property)
        }
        ViolationKind::AdditionalProperty { property } => {
            format!("should NOT have additional property '{}'", property)
        }
        ViolationKind::MinProperties(n) => {
            format!("should NOT have fewer than {} {}", n, plural(*n, "property", "properties"))
        }
        ViolationKind::MaxProperties(n) => {
            format!("should NOT have more than {} {}", n, plural(*n, "property", "properties"))
        }
        ViolationKind::MinItems(n) => {
            format!("should NOT have fewer than {} {}", n, plural(*n, "item", "items"))
        }
        ViolationKind::MaxItems(n) | ViolationKind::AdditionalItems(n) => {
            format!("should NOT have more than {} {}", n, plural(*n, "item", "items"))
        }
        ViolationKind::UniqueItems {
            index,
            duplicate_of,
        } => format!(
            "should NOT have duplicate items (items ## {} and {} are identical)",
            index, duplicate_of
        ),
        ViolationKind::Enum => "should be equal to one of the allowed values".to_string(),
        ViolationKind::Const => "should be equal to constant".to_string(),
        ViolationKind::Minimum { limit, exclusive } => {
            format!("should be {} {}", if *exclusive { ">" } else { ">=" }, limit)
        }
        ViolationKind::Maximum { limit, exclusive } => {
            format!("should be {} {}", if *exclusive { "<" } else { "<=" }, limit)
        }
        ViolationKind::MultipleOf(n) => format!("should be multiple of {}", n),
        ViolationKind::MinLength(n) => format!(
            "should NOT be shorter than {} {}",
            n,
            plural(*n, "character", "characters")
        ),
        ViolationKind::MaxLength(n) => format!(
            "should NOT be longer than {} {}",
            n,
            plural(*n, "character", "characters")
        ),
        ViolationKind::Pattern(pattern) => format!("should match pattern \"{}\"", pattern),
        ViolationKind::Format(format) => format!("should match format \"{}\"", format),
        ViolationKind::FalseSchema => "should NOT be present (boolean schema is false)".to_string(),
        ViolationKind::Not => "should NOT be valid".to_string(),
        ViolationKind::AnyOf => "should match some schema in anyOf".to_string(),
        ViolationKind::OneOf { .. } => "should match exactly one schema in oneOf".to_string(),
    }
}

fn plural(n: u64, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
