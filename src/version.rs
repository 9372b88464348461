//! API description versioning
//!
//! OpenAPI 2 (Swagger) keeps schemas under `definitions`; OpenAPI 3 keeps them
//! under `components.schemas`. Everything downstream of the index addresses
//! schemas by name, so this is the only place the difference is spelled out.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Result, SchemaError};

/// Major version of the API description format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecVersion {
    /// Swagger / OpenAPI 2.0
    V2,
    /// OpenAPI 3.x
    V3,
}

impl SpecVersion {
    /// Build from a declared major version number
    pub fn from_major(major: u64) -> Result<Self> {
        match major {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(SchemaError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Detect the version from the document's `swagger` / `openapi` field
    pub fn detect(root: &Value) -> Result<Self> {
        let declared = root
            .get("openapi")
            .or_else(|| root.get("swagger"))
            .ok_or_else(|| {
                SchemaError::UnsupportedVersion("missing 'openapi' or 'swagger' field".to_string())
            })?;

        let declared = match declared {
            Value::String(s) => s.clone(),
            // YAML `swagger: 2.0` arrives as a number
            Value::Number(n) => n.to_string(),
            other => return Err(SchemaError::UnsupportedVersion(other.to_string())),
        };

        Self::from_major(parse_version(&declared)?.major)
    }

    pub fn major(&self) -> u64 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Path segments of the schema definitions section
    pub fn definitions_path(&self) -> &'static [&'static str] {
        match self {
            Self::V2 => &["definitions"],
            Self::V3 => &["components", "schemas"],
        }
    }

    /// Dotted section name, for messages
    pub fn section_name(&self) -> &'static str {
        match self {
            Self::V2 => "definitions",
            Self::V3 => "components.schemas",
        }
    }

    /// JSON pointer of the named schema's definition
    pub fn schema_pointer(&self, name: &str) -> String {
        let mut pointer = String::from("#");
        for segment in self.definitions_path() {
            pointer.push('/');
            pointer.push_str(segment);
        }
        pointer.push('/');
        pointer.push_str(&escape_pointer_segment(name));
        pointer
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpenAPI {}", self.major())
    }
}

/// Parse "2.0", "3.0.3" or "3.1" into a semver version
fn parse_version(declared: &str) -> Result<Version> {
    let trimmed = declared.trim().strip_prefix('v').unwrap_or(declared.trim());
    let padded = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    Ok(Version::parse(&padded)?)
}

/// RFC 6901 escaping of a single pointer segment
pub(crate) fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_swagger_2() {
        let doc = json!({"swagger": "2.0", "definitions": {}});
        assert_eq!(SpecVersion::detect(&doc).unwrap(), SpecVersion::V2);
    }

    #[test]
    fn test_detect_openapi_3() {
        for declared in ["3.0.0", "3.0.3", "3.1"] {
            let doc = json!({"openapi": declared});
            assert_eq!(SpecVersion::detect(&doc).unwrap(), SpecVersion::V3);
        }
    }

    #[test]
    fn test_detect_numeric_version() {
        let doc = json!({"swagger": 2.0});
        assert_eq!(SpecVersion::detect(&doc).unwrap(), SpecVersion::V2);
    }

    #[test]
    fn test_detect_rejects_unknown() {
        assert!(matches!(
            SpecVersion::detect(&json!({"openapi": "4.0.0"})),
            Err(SchemaError::UnsupportedVersion(ref v)) if v == "4"
        ));
        assert!(SpecVersion::detect(&json!({"info": {}})).is_err());
    }

    #[test]
    fn test_schema_pointer() {
        assert_eq!(SpecVersion::V2.schema_pointer("Pet"), "#/definitions/Pet");
        assert_eq!(SpecVersion::V3.schema_pointer("Pet"), "#/components/schemas/Pet");
        assert_eq!(SpecVersion::V3.schema_pointer("a/b~c"), "#/components/schemas/a~1b~0c");
    }
}
