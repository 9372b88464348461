//! Schema Index
//!
//! Version-agnostic table of schema name -> definition pointer, built once per
//! loaded document. Schemas are not inspected here; a malformed schema only
//! shows up when something is validated against it.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::schema::SchemaNode;
use crate::version::SpecVersion;

/// A named schema definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub pointer: String,
}

/// Mapping from schema name to its definition, in declaration order
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    version: SpecVersion,
    entries: Vec<IndexEntry>,
    by_name: HashMap<String, usize>,
}

impl SchemaIndex {
    /// Index the definitions section of `root` for the given version.
    ///
    /// Fails only when the section is missing altogether.
    pub fn build(root: &Value, version: SpecVersion) -> Result<Self> {
        let mut section = root;
        for segment in version.definitions_path() {
            section = section.get(segment).ok_or(SchemaError::NoSchemasDeclared {
                version: version.major(),
                section: version.section_name(),
            })?;
        }

        let definitions = section.as_object().ok_or(SchemaError::NoSchemasDeclared {
            version: version.major(),
            section: version.section_name(),
        })?;

        let mut entries = Vec::with_capacity(definitions.len());
        let mut by_name = HashMap::with_capacity(definitions.len());

        for name in definitions.keys() {
            by_name.insert(name.clone(), entries.len());
            entries.push(IndexEntry {
                name: name.clone(),
                pointer: version.schema_pointer(name),
            });
        }

        tracing::debug!(
            version = %version,
            schemas = entries.len(),
            "built schema index"
        );

        Ok(Self {
            version,
            entries,
            by_name,
        })
    }

    pub fn version(&self) -> SpecVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Schema names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&IndexEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Look up a named schema inside `root`, the document this index was built from
    pub fn get<'a>(&'a self, root: &'a Value, name: &str) -> Option<SchemaNode<'a>> {
        let entry = self.entry(name)?;
        let mut value = root;
        for segment in self.version.definitions_path() {
            value = value.get(segment)?;
        }
        value = value.get(name)?;
        Some(SchemaNode::new(&entry.pointer, value))
    }

    /// Names that fuzzily resemble `query`, best first
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored: Vec<(i64, &str)> = self
            .names()
            .filter_map(|name| {
                matcher
                    .fuzzy_match(name, query)
                    .or_else(|| matcher.fuzzy_match(query, name))
                    .map(|score| (score, name))
            })
            .collect();

        // Stable on ties so suggestions keep declaration order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}
