//! API Spec Schema Checker
//!
//! Checks JSON-like values against the schemas declared in an OpenAPI 2
//! (`definitions`) or OpenAPI 3 (`components.schemas`) document and explains
//! every failure in one line per reason.
//!
//! ## Features
//!
//! - **Schema Index**: schema name → node, for both spec generations
//! - **`$ref` Resolution**: local JSON-Pointer references, cycles reported
//!   as errors instead of looping
//! - **Validation**: type, object, array, string and numeric keywords plus
//!   `allOf` / `anyOf` / `oneOf` / `not`
//! - **Reporting**: ordered, deduplicated, path-qualified reasons
//!
//! ## Example
//!
//! ```
//! use apispec_schemas::SpecDocument;
//! use serde_json::json;
//!
//! let doc = SpecDocument::from_value(json!({
//!     "openapi": "3.0.0",
//!     "components": {"schemas": {"StringSchema": {"type": "string"}}}
//! }))?;
//!
//! let outcome = doc.validate(&json!(123), "StringSchema")?;
//! assert!(!outcome.valid);
//! assert_eq!(outcome.reasons, vec!["object should be string"]);
//! # Ok::<(), apispec_schemas::SchemaError>(())
//! ```

pub mod assertion;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod graph;
pub mod index;
pub mod loader;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod validator;
pub mod version;

pub use assertion::{AssertionError, SatisfySchema};
pub use config::CheckConfig;
pub use document::SpecDocument;
pub use error::{Result, SchemaError};
pub use graph::RefGraph;
pub use index::SchemaIndex;
pub use loader::{load_path, load_str, SpecFormat};
pub use report::{Reporter, ValidationOutcome};
pub use resolver::{RefResolver, ResolutionStack};
pub use schema::SchemaNode;
pub use validator::{InstancePath, Validator, Violation, ViolationKind};
pub use version::SpecVersion;
