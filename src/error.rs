//! Error types for schema lookup and resolution

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Structural errors. A value failing its schema is not one of these; it is
/// reported through [`crate::ValidationOutcome`].
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schemaName must match a schema in your API spec: '{name}' not found{}", format_suggestions(.suggestions))]
    SchemaNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("No schemas declared: OpenAPI {version} document has no '{section}' section")]
    NoSchemasDeclared { version: u64, section: &'static str },

    #[error("Cannot resolve $ref '{pointer}'")]
    UnresolvableRef { pointer: String },

    #[error("$ref cycle detected: {}", .chain.join(" -> "))]
    RefCycle { chain: Vec<String> },

    #[error("Unsupported API description version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

impl SchemaError {
    /// The caller asked for something the document does not declare.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::SchemaNotFound { .. } | Self::NoSchemasDeclared { .. })
    }

    /// The document itself is defective: a `$ref` is dangling or cyclic.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::UnresolvableRef { .. } | Self::RefCycle { .. })
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
