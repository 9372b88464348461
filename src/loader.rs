//! Spec Loading
//!
//! Reads an API description from text or a file (JSON or YAML) and hands it
//! to [`SpecDocument`].

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::document::SpecDocument;
use crate::error::Result;
use crate::version::SpecVersion;

/// Serialization of a spec document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Guess from the file extension; `None` when it says nothing
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse document text into a value tree
pub fn parse_str(text: &str, format: SpecFormat) -> Result<Value> {
    Ok(match format {
        SpecFormat::Json => serde_json::from_str(text)?,
        SpecFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Parse and index a document, detecting its version
pub fn load_str(text: &str, format: SpecFormat) -> Result<SpecDocument> {
    SpecDocument::from_value(parse_str(text, format)?)
}

/// Parse and index a document declared as `version`
pub fn load_str_as(text: &str, format: SpecFormat, version: SpecVersion) -> Result<SpecDocument> {
    SpecDocument::new(parse_str(text, format)?, version)
}

/// Read, parse and index a document from disk.
///
/// Files without a `.json`/`.yaml`/`.yml` extension are tried as JSON first,
/// then as YAML.
pub fn load_path(path: impl AsRef<Path>) -> Result<SpecDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    tracing::debug!(path = %path.display(), "reading API description");

    let root = match SpecFormat::from_path(path) {
        Some(format) => parse_str(&content, format)?,
        None => match parse_str(&content, SpecFormat::Json) {
            Ok(root) => root,
            Err(_) => parse_str(&content, SpecFormat::Yaml)?,
        },
    };

    SpecDocument::from_value(root)
}
