//! Assertion layer
//!
//! Plain-text glue for test code: maps a [`ValidationOutcome`] to pass/fail,
//! optionally negated, with a message explaining the failure. Registering it
//! with a particular test framework is left to the caller.

use serde_json::Value;
use thiserror::Error;

use crate::config::{CheckConfig, ValidationConfig};
use crate::document::SpecDocument;
use crate::error::SchemaError;
use crate::report::ValidationOutcome;

/// Why an assertion did not pass
#[derive(Error, Debug)]
pub enum AssertionError {
    /// The check ran and came out the wrong way
    #[error("{message}")]
    Unsatisfied {
        message: String,
        outcome: ValidationOutcome,
    },

    /// The check could not run: unknown schema name or a broken document
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AssertionError {
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        match self {
            Self::Unsatisfied { outcome, .. } => Some(outcome),
            Self::Schema(_) => None,
        }
    }
}

/// "value satisfies the schema called `schema_name`", or its negation
#[derive(Debug, Clone)]
pub struct SatisfySchema {
    schema_name: String,
    negated: bool,
    validation: ValidationConfig,
    separator: String,
}

impl SatisfySchema {
    pub fn new(schema_name: impl Into<String>) -> Self {
        let defaults = CheckConfig::default();
        Self {
            schema_name: schema_name.into(),
            negated: false,
            validation: defaults.validation,
            separator: defaults.report.separator,
        }
    }

    /// Expect the value NOT to satisfy the schema
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn with_config(mut self, config: &CheckConfig) -> Self {
        self.validation = config.validation;
        self.separator = config.report.separator.clone();
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Run the check. A missing schema fails both polarities the same way.
    pub fn evaluate(&self, doc: &SpecDocument, received: &Value) -> Result<(), AssertionError> {
        let schema = doc.schema(&self.schema_name)?;
        let outcome = doc.validator(self.validation).validate(received, schema)?;

        if outcome.valid != self.negated {
            return Ok(());
        }

        let message = self.failure_message(&outcome, received, schema.value());
        Err(AssertionError::Unsatisfied { message, outcome })
    }

    fn failure_message(&self, outcome: &ValidationOutcome, received: &Value, schema: &Value) -> String {
        let name = &self.schema_name;
        let mut message = if self.negated {
            format!(
                "expected received not to satisfy the '{}' schema defined in your API spec\n",
                name
            )
        } else {
            format!(
                "expected received to satisfy the '{}' schema defined in your API spec\n\
                 received did not satisfy it because: {}\n\n",
                name,
                outcome.describe(&self.separator)
            )
        };

        message.push_str(&format!("received was: {}\n\n", render(received)));
        message.push_str(&format!("The '{}' schema in API spec: {}", name, render(schema)));
        message
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
