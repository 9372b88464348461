//! Spec Document
//!
//! An explicit, immutable instance of a loaded API description. Nothing here
//! is global: independently loaded documents coexist and can be shared
//! across threads without locking.

use serde_json::Value;

use crate::config::ValidationConfig;
use crate::error::{Result, SchemaError};
use crate::graph::RefGraph;
use crate::index::SchemaIndex;
use crate::report::ValidationOutcome;
use crate::resolver::RefResolver;
use crate::schema::SchemaNode;
use crate::validator::Validator;
use crate::version::SpecVersion;

/// How many "did you mean" names a missing-schema error carries
const MAX_SUGGESTIONS: usize = 3;

/// A loaded OpenAPI document plus its schema index
#[derive(Debug, Clone)]
pub struct SpecDocument {
    root: Value,
    index: SchemaIndex,
}

impl SpecDocument {
    /// Wrap a parsed document declared as `version`
    pub fn new(root: Value, version: SpecVersion) -> Result<Self> {
        let index = SchemaIndex::build(&root, version)?;

        let cycles = RefGraph::build(&root, &index).cycles();
        for group in &cycles {
            tracing::warn!(
                schemas = %group.join(", "),
                "schemas reference each other in a $ref cycle; validating against them will fail"
            );
        }

        tracing::debug!(
            version = %version,
            schemas = index.len(),
            cycles = cycles.len(),
            "loaded API description"
        );

        Ok(Self { root, index })
    }

    /// Wrap a parsed document, detecting the version from `swagger` / `openapi`
    pub fn from_value(root: Value) -> Result<Self> {
        let version = SpecVersion::detect(&root)?;
        Self::new(root, version)
    }

    pub fn version(&self) -> SpecVersion {
        self.index.version()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    /// The named schema, or the configuration error naming what was asked for
    pub fn schema(&self, name: &str) -> Result<SchemaNode<'_>> {
        self.index
            .get(&self.root, name)
            .ok_or_else(|| SchemaError::SchemaNotFound {
                name: name.to_string(),
                suggestions: self.index.suggest(name, MAX_SUGGESTIONS),
            })
    }

    pub fn resolver(&self) -> RefResolver<'_> {
        RefResolver::new(&self.root)
    }

    pub fn validator(&self, config: ValidationConfig) -> Validator<'_> {
        Validator::new(self.resolver(), config)
    }

    pub fn ref_graph(&self) -> RefGraph {
        RefGraph::build(&self.root, &self.index)
    }

    /// Check `value` against the schema called `schema_name`
    pub fn validate(&self, value: &Value, schema_name: &str) -> Result<ValidationOutcome> {
        self.validate_with(value, schema_name, ValidationConfig::default())
    }

    pub fn validate_with(
        &self,
        value: &Value,
        schema_name: &str,
        config: ValidationConfig,
    ) -> Result<ValidationOutcome> {
        let node = self.schema(schema_name)?;
        self.validator(config).validate(value, node)
    }
}
