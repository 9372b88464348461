//! Validator
//!
//! Evaluates a value against a schema with JSON-Schema semantics and collects
//! every violation instead of stopping at the first one: composition
//! reporting needs to see what each branch rejected.
//!
//! Every `$ref` reachable from the schema is verified before evaluation, so a
//! dangling or cyclic reference fails the call regardless of the value being
//! checked. Evaluation then follows references in place; nothing is copied.
//! Keywords are evaluated in the order the schema declares them.

use fancy_regex::Regex;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::config::ValidationConfig;
use crate::error::{Result, SchemaError};
use crate::format::FormatChecker;
use crate::report::{Reporter, ValidationOutcome};
use crate::resolver::{RefResolver, ResolutionStack};
use crate::schema::{ref_target, SchemaNode};

// =============================================================================
// Instance paths
// =============================================================================

/// One step into a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Property(String),
    Index(usize),
}

/// Location of a value inside the checked value; empty at the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push_property(&mut self, name: &str) {
        self.0.push(PathSegment::Property(name.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "object");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Property(name) if is_identifier(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Property(name) => {
                    write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// =============================================================================
// Violations
// =============================================================================

/// What a value failed to satisfy
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    Type { expected: Vec<String> },
    Required { property: String },
    AdditionalProperty { property: String },
    MinProperties(u64),
    MaxProperties(u64),
    MinItems(u64),
    MaxItems(u64),
    /// More items than a tuple `items` list allows
    AdditionalItems(u64),
    /// `index` repeats the item at `duplicate_of`
    UniqueItems { index: usize, duplicate_of: usize },
    Enum,
    Const,
    Minimum { limit: Number, exclusive: bool },
    Maximum { limit: Number, exclusive: bool },
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(String),
    Format(String),
    FalseSchema,
    Not,
    AnyOf,
    /// `matched` is 0 when no branch matched, >1 when the match is ambiguous
    OneOf { matched: usize },
}

/// A single raw failure at a location
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: InstancePath,
    pub kind: ViolationKind,
}

// =============================================================================
// Validator
// =============================================================================

/// Evaluates values against schemas of one document
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    resolver: RefResolver<'a>,
    config: ValidationConfig,
}

impl<'a> Validator<'a> {
    pub fn new(resolver: RefResolver<'a>, config: ValidationConfig) -> Self {
        Self { resolver, config }
    }

    /// Check `value` against `node`, producing pass/fail plus formatted reasons
    pub fn validate(&self, value: &Value, node: SchemaNode<'a>) -> Result<ValidationOutcome> {
        let violations = self.violations(value, node)?;
        Ok(Reporter::new().outcome(&violations))
    }

    pub fn is_valid(&self, value: &Value, node: SchemaNode<'a>) -> Result<bool> {
        Ok(self.violations(value, node)?.is_empty())
    }

    /// Raw violations, in schema declaration order
    pub fn violations(&self, value: &Value, node: SchemaNode<'a>) -> Result<Vec<Violation>> {
        self.resolver.verify(node)?;

        let mut evaluation = Evaluation::new(*self);
        let mut path = InstancePath::root();
        let mut out = Vec::new();
        evaluation.evaluate(value, node.value(), &mut path, &mut out)?;

        tracing::debug!(
            schema = node.pointer(),
            violations = out.len(),
            patterns = evaluation.patterns.len(),
            "validated value"
        );
        Ok(out)
    }
}

/// State of a single `violations` call. Compiled patterns live here and are
/// reused across every element the call visits.
struct Evaluation<'a> {
    resolver: RefResolver<'a>,
    config: ValidationConfig,
    patterns: HashMap<&'a str, Regex>,
}

impl<'a> Evaluation<'a> {
    fn new(validator: Validator<'a>) -> Self {
        Self {
            resolver: validator.resolver,
            config: validator.config,
            patterns: HashMap::new(),
        }
    }

    fn evaluate(
        &mut self,
        value: &Value,
        schema: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        // Siblings of $ref are ignored, as in OpenAPI 2 and 3.0
        let schema = match ref_target(schema) {
            Some(target) => self.follow(target)?,
            None => schema,
        };

        let obj = match schema {
            Value::Object(obj) => obj,
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => {
                push(out, path, ViolationKind::FalseSchema);
                return Ok(());
            }
            other => {
                return Err(SchemaError::InvalidFormat(format!(
                    "schema must be an object or boolean, got {}",
                    other
                )))
            }
        };

        for (key, kw) in obj {
            match key.as_str() {
                "type" => self.check_type(value, kw, obj, path, out)?,
                "required" => check_required(value, kw, path, out),
                "properties" => self.check_properties(value, kw, path, out)?,
                "patternProperties" => self.check_pattern_properties(value, kw, path, out)?,
                "additionalProperties" => self.check_additional_properties(value, kw, obj, path, out)?,
                "minProperties" => {
                    if let Value::Object(map) = value {
                        let limit = limit_u64(key, kw)?;
                        if (map.len() as u64) < limit {
                            push(out, path, ViolationKind::MinProperties(limit));
                        }
                    }
                }
                "maxProperties" => {
                    if let Value::Object(map) = value {
                        let limit = limit_u64(key, kw)?;
                        if map.len() as u64 > limit {
                            push(out, path, ViolationKind::MaxProperties(limit));
                        }
                    }
                }
                "items" => self.check_items(value, kw, path, out)?,
                "additionalItems" => self.check_additional_items(value, kw, obj, path, out)?,
                "minItems" => {
                    if let Value::Array(items) = value {
                        let limit = limit_u64(key, kw)?;
                        if (items.len() as u64) < limit {
                            push(out, path, ViolationKind::MinItems(limit));
                        }
                    }
                }
                "maxItems" => {
                    if let Value::Array(items) = value {
                        let limit = limit_u64(key, kw)?;
                        if items.len() as u64 > limit {
                            push(out, path, ViolationKind::MaxItems(limit));
                        }
                    }
                }
                "uniqueItems" => check_unique_items(value, kw, path, out),
                "enum" => {
                    let allowed = kw.as_array().ok_or_else(|| malformed(key, kw))?;
                    if !allowed.iter().any(|candidate| values_equal(candidate, value)) {
                        push(out, path, ViolationKind::Enum);
                    }
                }
                "const" => {
                    if !values_equal(kw, value) {
                        push(out, path, ViolationKind::Const);
                    }
                }
                "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
                    check_range(value, key, kw, obj, path, out)?
                }
                "multipleOf" => check_multiple_of(value, key, kw, path, out)?,
                "minLength" => {
                    if let Value::String(s) = value {
                        let limit = limit_u64(key, kw)?;
                        if (s.chars().count() as u64) < limit {
                            push(out, path, ViolationKind::MinLength(limit));
                        }
                    }
                }
                "maxLength" => {
                    if let Value::String(s) = value {
                        let limit = limit_u64(key, kw)?;
                        if s.chars().count() as u64 > limit {
                            push(out, path, ViolationKind::MaxLength(limit));
                        }
                    }
                }
                "pattern" => {
                    if let Value::String(s) = value {
                        let pattern = kw.as_str().ok_or_else(|| malformed(key, kw))?;
                        if !self.is_match(pattern, s)? {
                            push(out, path, ViolationKind::Pattern(pattern.to_string()));
                        }
                    }
                }
                "format" => {
                    if self.config.validate_formats {
                        if let Some(format) = kw.as_str() {
                            if !FormatChecker::shared().check(format, value) {
                                push(out, path, ViolationKind::Format(format.to_string()));
                            }
                        }
                    }
                }
                "not" => {
                    if self.evaluate_branch(value, kw, path)?.is_empty() {
                        push(out, path, ViolationKind::Not);
                    }
                }
                "allOf" => {
                    let branches = kw.as_array().ok_or_else(|| malformed(key, kw))?;
                    for branch in branches {
                        self.evaluate(value, branch, path, out)?;
                    }
                }
                "anyOf" => self.check_any_of(value, key, kw, path, out)?,
                "oneOf" => self.check_one_of(value, key, kw, path, out)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// The concrete schema behind a `$ref`, following alias chains
    fn follow(&self, target: &'a str) -> Result<&'a Value> {
        let mut stack = ResolutionStack::rooted(target);
        let node = self.resolver.resolve(self.resolver.lookup(target)?, &mut stack)?;
        Ok(node.value())
    }

    fn is_match(&mut self, pattern: &'a str, text: &str) -> Result<bool> {
        let regex = match self.patterns.entry(pattern) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(compile(pattern)?),
        };
        regex.is_match(text).map_err(|e| {
            SchemaError::InvalidFormat(format!("pattern '{}' could not be evaluated: {}", pattern, e))
        })
    }

    /// Evaluate a composition branch in isolation
    fn evaluate_branch(
        &mut self,
        value: &Value,
        schema: &'a Value,
        path: &mut InstancePath,
    ) -> Result<Vec<Violation>> {
        let mut branch = Vec::new();
        self.evaluate(value, schema, path, &mut branch)?;
        Ok(branch)
    }

    fn check_type(
        &self,
        value: &Value,
        kw: &Value,
        schema: &Map<String, Value>,
        path: &InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let expected: Vec<&str> = match kw {
            Value::String(ty) => vec![ty.as_str()],
            Value::Array(list) => list
                .iter()
                .map(|ty| ty.as_str().ok_or_else(|| malformed("type", kw)))
                .collect::<Result<_>>()?,
            _ => return Err(malformed("type", kw)),
        };

        if value.is_null() && self.config.honor_nullable && is_nullable(schema) {
            return Ok(());
        }

        let mut matched = false;
        for ty in &expected {
            if type_matches(value, ty)? {
                matched = true;
            }
        }
        if !matched {
            push(
                out,
                path,
                ViolationKind::Type {
                    expected: expected.iter().map(|t| t.to_string()).collect(),
                },
            );
        }
        Ok(())
    }

    fn check_properties(
        &mut self,
        value: &Value,
        kw: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let Value::Object(map) = value else {
            return Ok(());
        };
        let properties = kw.as_object().ok_or_else(|| malformed("properties", kw))?;

        // Schema order, not input order
        for (name, sub) in properties {
            if let Some(prop) = map.get(name) {
                path.push_property(name);
                let result = self.evaluate(prop, sub, path, out);
                path.pop();
                result?;
            }
        }
        Ok(())
    }

    fn check_pattern_properties(
        &mut self,
        value: &Value,
        kw: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let Value::Object(map) = value else {
            return Ok(());
        };
        let patterns = kw.as_object().ok_or_else(|| malformed("patternProperties", kw))?;

        for (pattern, sub) in patterns {
            for (name, prop) in map {
                if self.is_match(pattern, name)? {
                    path.push_property(name);
                    let result = self.evaluate(prop, sub, path, out);
                    path.pop();
                    result?;
                }
            }
        }
        Ok(())
    }

    fn check_additional_properties(
        &mut self,
        value: &Value,
        kw: &'a Value,
        schema: &'a Map<String, Value>,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let Value::Object(map) = value else {
            return Ok(());
        };
        if matches!(kw, Value::Bool(true)) {
            return Ok(());
        }

        let declared = schema.get("properties").and_then(Value::as_object);
        let patterns = schema.get("patternProperties").and_then(Value::as_object);

        for (name, prop) in map {
            if declared.is_some_and(|d| d.contains_key(name)) {
                continue;
            }
            let mut covered = false;
            for pattern in patterns.into_iter().flat_map(|p| p.keys()) {
                if self.is_match(pattern, name)? {
                    covered = true;
                    break;
                }
            }
            if covered {
                continue;
            }

            match kw {
                Value::Bool(false) => push(
                    out,
                    path,
                    ViolationKind::AdditionalProperty {
                        property: name.clone(),
                    },
                ),
                Value::Object(_) => {
                    path.push_property(name);
                    let result = self.evaluate(prop, kw, path, out);
                    path.pop();
                    result?;
                }
                _ => return Err(malformed("additionalProperties", kw)),
            }
        }
        Ok(())
    }

    fn check_items(
        &mut self,
        value: &Value,
        kw: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let Value::Array(items) = value else {
            return Ok(());
        };

        match kw {
            Value::Array(tuple) => {
                for (i, (item, sub)) in items.iter().zip(tuple).enumerate() {
                    path.push_index(i);
                    let result = self.evaluate(item, sub, path, out);
                    path.pop();
                    result?;
                }
            }
            _ => {
                for (i, item) in items.iter().enumerate() {
                    path.push_index(i);
                    let result = self.evaluate(item, kw, path, out);
                    path.pop();
                    result?;
                }
            }
        }
        Ok(())
    }

    fn check_additional_items(
        &mut self,
        value: &Value,
        kw: &'a Value,
        schema: &'a Map<String, Value>,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let (Value::Array(items), Some(Value::Array(tuple))) = (value, schema.get("items")) else {
            return Ok(());
        };
        if items.len() <= tuple.len() {
            return Ok(());
        }

        match kw {
            Value::Bool(false) => {
                push(out, path, ViolationKind::AdditionalItems(tuple.len() as u64));
            }
            Value::Object(_) => {
                for (i, item) in items.iter().enumerate().skip(tuple.len()) {
                    path.push_index(i);
                    let result = self.evaluate(item, kw, path, out);
                    path.pop();
                    result?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_any_of(
        &mut self,
        value: &Value,
        key: &str,
        kw: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let branches = kw.as_array().ok_or_else(|| malformed(key, kw))?;

        let mut failures = Vec::new();
        for branch in branches {
            let violations = self.evaluate_branch(value, branch, path)?;
            if violations.is_empty() {
                return Ok(());
            }
            failures.extend(violations);
        }

        out.extend(failures);
        push(out, path, ViolationKind::AnyOf);
        Ok(())
    }

    fn check_one_of(
        &mut self,
        value: &Value,
        key: &str,
        kw: &'a Value,
        path: &mut InstancePath,
        out: &mut Vec<Violation>,
    ) -> Result<()> {
        let branches = kw.as_array().ok_or_else(|| malformed(key, kw))?;

        let mut matched = 0;
        let mut failures = Vec::new();
        for branch in branches {
            let violations = self.evaluate_branch(value, branch, path)?;
            if violations.is_empty() {
                matched += 1;
            } else {
                failures.extend(violations);
            }
        }

        match matched {
            1 => {}
            0 => {
                out.extend(failures);
                push(out, path, ViolationKind::OneOf { matched });
            }
            // An ambiguous match is the defect itself; branch reasons would only mislead
            _ => push(out, path, ViolationKind::OneOf { matched }),
        }
        Ok(())
    }
}

// =============================================================================
// Keyword helpers
// =============================================================================

fn push(out: &mut Vec<Violation>, path: &InstancePath, kind: ViolationKind) {
    out.push(Violation {
        path: path.clone(),
        kind,
    });
}

fn malformed(keyword: &str, kw: &Value) -> SchemaError {
    SchemaError::InvalidFormat(format!("invalid '{}' keyword: {}", keyword, kw))
}

fn limit_u64(keyword: &str, kw: &Value) -> Result<u64> {
    kw.as_u64()
        .or_else(|| kw.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
        .ok_or_else(|| malformed(keyword, kw))
}

/// ECMA-262 style patterns, look-around and backreferences included
fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| SchemaError::InvalidFormat(format!("invalid pattern '{}': {}", pattern, e)))
}

fn is_nullable(schema: &Map<String, Value>) -> bool {
    ["nullable", "x-nullable"]
        .iter()
        .any(|key| schema.get(*key) == Some(&Value::Bool(true)))
}

fn type_matches(value: &Value, ty: &str) -> Result<bool> {
    Ok(match ty {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => is_integer(value),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        other => {
            return Err(SchemaError::InvalidFormat(format!(
                "unknown type '{}'",
                other
            )))
        }
    })
}

/// Whole numbers only; `1.0` counts, `1.5` does not
fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64()
                || n.is_u64()
                || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn check_required(value: &Value, kw: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    let (Value::Object(map), Value::Array(required)) = (value, kw) else {
        return;
    };
    for name in required.iter().filter_map(Value::as_str) {
        if !map.contains_key(name) {
            push(
                out,
                path,
                ViolationKind::Required {
                    property: name.to_string(),
                },
            );
        }
    }
}

fn check_unique_items(value: &Value, kw: &Value, path: &InstancePath, out: &mut Vec<Violation>) {
    let (Value::Array(items), Value::Bool(true)) = (value, kw) else {
        return;
    };
    for index in 1..items.len() {
        if let Some(duplicate_of) = (0..index).find(|&i| values_equal(&items[i], &items[index])) {
            push(out, path, ViolationKind::UniqueItems { index, duplicate_of });
            return;
        }
    }
}

fn check_range(
    value: &Value,
    key: &str,
    kw: &Value,
    schema: &Map<String, Value>,
    path: &InstancePath,
    out: &mut Vec<Violation>,
) -> Result<()> {
    let Value::Number(n) = value else {
        return Ok(());
    };

    // Draft 4 spells exclusivity as a boolean next to minimum/maximum
    if matches!(kw, Value::Bool(_)) && key.starts_with("exclusive") {
        return Ok(());
    }
    let limit = match kw {
        Value::Number(limit) => limit,
        _ => return Err(malformed(key, kw)),
    };

    let Some(order) = compare_numbers(n, limit) else {
        return Ok(());
    };

    let kind = match key {
        "minimum" => {
            let exclusive = schema.get("exclusiveMinimum") == Some(&Value::Bool(true));
            (order.is_lt() || exclusive && order.is_eq()).then(|| ViolationKind::Minimum {
                limit: limit.clone(),
                exclusive,
            })
        }
        "maximum" => {
            let exclusive = schema.get("exclusiveMaximum") == Some(&Value::Bool(true));
            (order.is_gt() || exclusive && order.is_eq()).then(|| ViolationKind::Maximum {
                limit: limit.clone(),
                exclusive,
            })
        }
        "exclusiveMinimum" => order.is_le().then(|| ViolationKind::Minimum {
            limit: limit.clone(),
            exclusive: true,
        }),
        _ => order.is_ge().then(|| ViolationKind::Maximum {
            limit: limit.clone(),
            exclusive: true,
        }),
    };

    if let Some(kind) = kind {
        push(out, path, kind);
    }
    Ok(())
}

fn check_multiple_of(
    value: &Value,
    key: &str,
    kw: &Value,
    path: &InstancePath,
    out: &mut Vec<Violation>,
) -> Result<()> {
    let Value::Number(n) = value else {
        return Ok(());
    };
    let divisor = match kw {
        Value::Number(d) if d.as_f64().is_some_and(|f| f > 0.0) => d,
        _ => return Err(malformed(key, kw)),
    };

    let is_multiple = match (as_integer(n), as_integer(divisor)) {
        (Some(v), Some(d)) => v % d == 0,
        _ => {
            let quotient = n.as_f64().unwrap_or(f64::NAN) / divisor.as_f64().unwrap_or(f64::NAN);
            quotient.is_finite() && (quotient - quotient.round()).abs() < 1e-9
        }
    };

    if !is_multiple {
        push(out, path, ViolationKind::MultipleOf(divisor.clone()));
    }
    Ok(())
}

/// Integer view of a JSON number, covering the whole `i64` and `u64` ranges
fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact when both sides are integers, `f64` otherwise
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Structural equality where `1` and `1.0` are the same number
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, a)| y.get(k).is_some_and(|b| values_equal(a, b)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(schema: Value, value: Value) -> Vec<(String, ViolationKind)> {
        kinds_with(schema, value, ValidationConfig::default())
    }

    fn kinds_with(schema: Value, value: Value, config: ValidationConfig) -> Vec<(String, ViolationKind)> {
        let root = json!({"swagger": "2.0", "definitions": {"S": schema}});
        let validator = Validator::new(RefResolver::new(&root), config);
        let node = SchemaNode::new("#/definitions/S", &root["definitions"]["S"]);
        validator
            .violations(&value, node)
            .unwrap()
            .into_iter()
            .map(|v| (v.path.to_string(), v.kind))
            .collect()
    }

    fn is_valid(schema: Value, value: Value) -> bool {
        kinds(schema, value).is_empty()
    }

    #[test]
    fn test_primitive_types() {
        assert!(is_valid(json!({"type": "string"}), json!("string")));
        assert!(is_valid(json!({"type": "number"}), json!(1.5)));
        assert!(is_valid(json!({"type": "boolean"}), json!(false)));
        assert!(is_valid(json!({"type": "null"}), json!(null)));
        assert!(is_valid(json!({"type": "array"}), json!([])));
        assert!(is_valid(json!({"type": "object"}), json!({})));
        assert_eq!(
            kinds(json!({"type": "string"}), json!(123)),
            vec![("object".to_string(), ViolationKind::Type { expected: vec!["string".into()] })]
        );
    }

    #[test]
    fn test_integer_requires_whole_number() {
        assert!(is_valid(json!({"type": "integer"}), json!(123)));
        assert!(is_valid(json!({"type": "integer"}), json!(-4)));
        assert!(is_valid(json!({"type": "integer"}), json!(2.0)));
        assert!(!is_valid(json!({"type": "integer"}), json!(1.5)));
        assert!(!is_valid(json!({"type": "integer"}), json!("should be integer")));
        assert!(is_valid(json!({"type": "number"}), json!(1.5)));
    }

    #[test]
    fn test_type_list_and_nullable() {
        assert!(is_valid(json!({"type": ["string", "null"]}), json!(null)));
        assert!(is_valid(json!({"type": "string", "nullable": true}), json!(null)));
        assert!(is_valid(json!({"type": "string", "x-nullable": true}), json!(null)));
        assert!(!is_valid(json!({"type": "string"}), json!(null)));

        let strict = ValidationConfig {
            honor_nullable: false,
            ..ValidationConfig::default()
        };
        assert_eq!(
            kinds_with(json!({"type": "string", "nullable": true}), json!(null), strict).len(),
            1
        );
    }

    #[test]
    fn test_required_and_properties() {
        let schema = json!({
            "type": "object",
            "required": ["property1"],
            "properties": {"property1": {"type": "string"}}
        });
        assert!(is_valid(schema.clone(), json!({"property1": "string"})));
        assert_eq!(
            kinds(schema.clone(), json!({"property1": 123})),
            vec![("property1".to_string(), ViolationKind::Type { expected: vec!["string".into()] })]
        );
        assert_eq!(
            kinds(schema, json!({})),
            vec![("object".to_string(), ViolationKind::Required { property: "property1".into() })]
        );
    }

    #[test]
    fn test_properties_follow_schema_order() {
        let schema = json!({
            "properties": {
                "b": {"type": "string"},
                "a": {"type": "string"}
            }
        });
        let paths: Vec<String> = kinds(schema, json!({"a": 1, "b": 2}))
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["b", "a"]);
    }

    #[test]
    fn test_nested_paths() {
        let schema = json!({
            "properties": {
                "owner": {"properties": {"first name": {"type": "string"}}},
                "tags": {"items": {"type": "string"}}
            }
        });
        let paths: Vec<String> = kinds(
            schema,
            json!({"owner": {"first name": 1}, "tags": ["ok", 2]}),
        )
        .into_iter()
        .map(|(p, _)| p)
        .collect();
        assert_eq!(paths, vec!["owner['first name']", "tags[1]"]);
    }

    #[test]
    fn test_additional_properties() {
        let closed = json!({"properties": {"a": {}}, "patternProperties": {"^x-": {}}, "additionalProperties": false});
        assert!(is_valid(closed.clone(), json!({"a": 1, "x-extra": 2})));
        assert_eq!(
            kinds(closed, json!({"a": 1, "b": 2})),
            vec![("object".to_string(), ViolationKind::AdditionalProperty { property: "b".into() })]
        );

        let typed = json!({"additionalProperties": {"type": "integer"}});
        assert_eq!(kinds(typed, json!({"n": 1, "s": "x"}))[0].0, "s");
    }

    #[test]
    fn test_array_keywords() {
        assert!(!is_valid(json!({"minItems": 2}), json!([1])));
        assert!(!is_valid(json!({"maxItems": 1}), json!([1, 2])));
        assert_eq!(
            kinds(json!({"uniqueItems": true}), json!([1, 2, 1.0])),
            vec![("object".to_string(), ViolationKind::UniqueItems { index: 2, duplicate_of: 0 })]
        );

        let tuple = json!({"items": [{"type": "string"}, {"type": "integer"}], "additionalItems": false});
        assert!(is_valid(tuple.clone(), json!(["a", 1])));
        assert_eq!(
            kinds(tuple, json!(["a", 1, true])),
            vec![("object".to_string(), ViolationKind::AdditionalItems(2))]
        );
    }

    #[test]
    fn test_enum_and_const() {
        assert!(is_valid(json!({"enum": ["a", "b"]}), json!("b")));
        assert!(is_valid(json!({"enum": [1]}), json!(1.0)));
        assert_eq!(kinds(json!({"enum": ["a"]}), json!("c"))[0].1, ViolationKind::Enum);
        assert!(is_valid(json!({"const": {"k": [1]}}), json!({"k": [1]})));
        assert!(!is_valid(json!({"const": 3}), json!(4)));
    }

    #[test]
    fn test_numeric_ranges() {
        assert!(is_valid(json!({"minimum": 3}), json!(3)));
        assert!(!is_valid(json!({"minimum": 3, "exclusiveMinimum": true}), json!(3)));
        assert!(!is_valid(json!({"exclusiveMinimum": 3}), json!(3)));
        assert!(is_valid(json!({"maximum": 3}), json!(3)));
        assert!(!is_valid(json!({"maximum": 3, "exclusiveMaximum": true}), json!(3)));
        assert!(!is_valid(json!({"exclusiveMaximum": 3}), json!(3.5)));
        assert!(is_valid(json!({"multipleOf": 0.1}), json!(0.3)));
        assert!(!is_valid(json!({"multipleOf": 2}), json!(3)));
        // Range keywords ignore non-numbers
        assert!(is_valid(json!({"minimum": 3}), json!("x")));
    }

    #[test]
    fn test_string_keywords() {
        assert!(is_valid(json!({"minLength": 2}), json!("ab")));
        assert!(!is_valid(json!({"minLength": 3}), json!("ab")));
        assert!(is_valid(json!({"maxLength": 2}), json!("ëé")));
        assert!(!is_valid(json!({"pattern": "^[a-z]+$"}), json!("ABC")));
        assert!(!is_valid(json!({"format": "email"}), json!("nope")));

        let lenient = ValidationConfig {
            validate_formats: false,
            ..ValidationConfig::default()
        };
        assert!(kinds_with(json!({"format": "email"}), json!("nope"), lenient).is_empty());
    }

    #[test]
    fn test_all_of_collects_every_branch() {
        let schema = json!({"allOf": [
            {"properties": {"property1": {"type": "string"}}},
            {"properties": {"property2": {"type": "string"}}}
        ]});
        assert!(is_valid(schema.clone(), json!({"property1": "a", "property2": "b"})));
        let paths: Vec<String> = kinds(schema, json!({"property1": 1, "property2": 2}))
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["property1", "property2"]);
    }

    #[test]
    fn test_any_of() {
        let schema = json!({"anyOf": [{"type": "number"}, {"type": "string"}]});
        assert!(is_valid(schema.clone(), json!(123)));
        assert!(is_valid(schema.clone(), json!("x")));
        let found: Vec<ViolationKind> = kinds(schema, json!(true)).into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            found,
            vec![
                ViolationKind::Type { expected: vec!["number".into()] },
                ViolationKind::Type { expected: vec!["string".into()] },
                ViolationKind::AnyOf,
            ]
        );
    }

    #[test]
    fn test_one_of() {
        let schema = json!({"oneOf": [{"type": "number"}, {"type": "string"}]});
        assert!(is_valid(schema.clone(), json!(1)));
        assert_eq!(kinds(schema, json!(null)).last().unwrap().1, ViolationKind::OneOf { matched: 0 });

        let ambiguous = json!({"oneOf": [{"type": "integer"}, {"type": "number"}]});
        assert_eq!(
            kinds(ambiguous, json!(1)),
            vec![("object".to_string(), ViolationKind::OneOf { matched: 2 })]
        );
    }

    #[test]
    fn test_not_and_boolean_schemas() {
        assert!(!is_valid(json!({"not": {"type": "string"}}), json!("x")));
        assert!(is_valid(json!({"not": {"type": "string"}}), json!(1)));
        assert!(!is_valid(json!({"properties": {"a": false}}), json!({"a": 1})));
        assert!(is_valid(json!({"properties": {"a": true}}), json!({"a": 1})));
    }

    #[test]
    fn test_malformed_schema_fails_at_validation_time() {
        let root = json!({"swagger": "2.0", "definitions": {
            "BadType": {"type": "text"},
            "BadPattern": {"pattern": "("}
        }});
        let validator = Validator::new(RefResolver::new(&root), ValidationConfig::default());
        for (name, pointer) in [
            ("BadType", "#/definitions/BadType"),
            ("BadPattern", "#/definitions/BadPattern"),
        ] {
            let node = SchemaNode::new(pointer, &root["definitions"][name]);
            let err = validator.violations(&json!("x"), node).unwrap_err();
            assert!(matches!(err, SchemaError::InvalidFormat(_)), "{}", name);
        }
    }

    #[test]
    fn test_ref_errors_propagate() {
        let root = json!({"swagger": "2.0", "definitions": {
            "Loop": {"items": {"$ref": "#/definitions/Loop"}},
            "Dangling": {"$ref": "#/definitions/Nowhere"}
        }});
        let validator = Validator::new(RefResolver::new(&root), ValidationConfig::default());

        // Cycles fail even for values that would never reach the recursive branch
        let node = SchemaNode::new("#/definitions/Loop", &root["definitions"]["Loop"]);
        assert!(matches!(
            validator.violations(&json!("not an array"), node),
            Err(SchemaError::RefCycle { .. })
        ));

        let node = SchemaNode::new("#/definitions/Dangling", &root["definitions"]["Dangling"]);
        assert!(matches!(
            validator.violations(&json!(1), node),
            Err(SchemaError::UnresolvableRef { .. })
        ));
    }

    #[test]
    fn test_pattern_look_around_and_backreferences() {
        let password = json!({"type": "string", "pattern": "^(?=.*[0-9]).{8,}$"});
        assert!(is_valid(password.clone(), json!("abcdefg1")));
        assert_eq!(
            kinds(password, json!("abcdefgh")),
            vec![("object".to_string(), ViolationKind::Pattern("^(?=.*[0-9]).{8,}$".into()))]
        );

        let doubled = json!({"pattern": "^(\\w)\\1$"});
        assert!(is_valid(doubled.clone(), json!("aa")));
        assert!(!is_valid(doubled, json!("ab")));

        let keyed = json!({"patternProperties": {"^(?!x-)": {"type": "integer"}}, "additionalProperties": false});
        assert_eq!(
            kinds(keyed, json!({"n": 1, "x-ext": "y", "s": "z"})),
            vec![
                ("s".to_string(), ViolationKind::Type { expected: vec!["integer".into()] }),
                ("object".to_string(), ViolationKind::AdditionalProperty { property: "x-ext".into() }),
            ]
        );
    }

    #[test]
    fn test_pattern_reused_across_items() {
        let schema = json!({"items": {"pattern": "^[a-z]+$"}});
        let paths: Vec<String> = kinds(schema, json!(["ok", "NO", "fine", "B4D"]))
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);

        let root = json!({"definitions": {}});
        let schema = json!({
            "items": {"pattern": "^[a-z]+$"},
            "additionalProperties": {"patternProperties": {"^[a-z]+$": {}}}
        });
        let mut evaluation = Evaluation::new(Validator::new(RefResolver::new(&root), ValidationConfig::default()));
        let mut out = Vec::new();
        evaluation
            .evaluate(&json!(["ok", "NO", "fine"]), &schema, &mut InstancePath::root(), &mut out)
            .unwrap();
        evaluation
            .evaluate(&json!({"k": {"x": 1, "y": 2}}), &schema, &mut InstancePath::root(), &mut out)
            .unwrap();
        assert_eq!(evaluation.patterns.len(), 1);
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        // 2^53 + 1 has no exact f64 form
        assert!(!is_valid(json!({"type": "integer", "minimum": 9007199254740993u64}), json!(9007199254740992u64)));
        assert!(is_valid(json!({"minimum": 9007199254740993u64}), json!(9007199254740993u64)));
        assert!(!is_valid(json!({"maximum": 9007199254740992i64}), json!(9007199254740993i64)));
        assert!(!is_valid(json!({"exclusiveMaximum": u64::MAX}), json!(u64::MAX)));
        assert!(is_valid(json!({"minimum": -1}), json!(u64::MAX)));
        assert!(!is_valid(json!({"const": 9007199254740993u64}), json!(9007199254740992u64)));
        assert!(!is_valid(json!({"enum": [9007199254740993i64]}), json!(9007199254740992i64)));
        assert!(!is_valid(json!({"multipleOf": 2}), json!(u64::MAX)));
    }

    #[test]
    fn test_shared_refs_are_followed_in_place() {
        // S0..S40, each with two properties pointing at the next level
        let depth = 40;
        let mut definitions = Map::new();
        for i in 0..depth {
            let next = format!("#/definitions/S{}", i + 1);
            definitions.insert(
                format!("S{}", i),
                json!({"type": "object", "properties": {"a": {"$ref": next}, "b": {"$ref": next}}}),
            );
        }
        definitions.insert(format!("S{}", depth), json!({"type": "string"}));
        let root = json!({"swagger": "2.0", "definitions": definitions});
        let validator = Validator::new(RefResolver::new(&root), ValidationConfig::default());
        let node = SchemaNode::new("#/definitions/S0", &root["definitions"]["S0"]);

        assert_eq!(
            validator.validate(&json!("just a string"), node).unwrap().reasons,
            vec!["object should be object"]
        );

        let mut value = json!(7);
        for _ in 0..depth {
            value = json!({ "a": value });
        }
        let reasons = validator.validate(&value, node).unwrap().reasons;
        assert_eq!(reasons, vec![format!("{} should be string", vec!["a"; depth].join("."))]);
    }

    #[test]
    fn test_alias_chain_at_root() {
        let root = json!({"swagger": "2.0", "definitions": {
            "StringSchema": {"type": "string"},
            "Alias": {"$ref": "#/definitions/StringSchema"},
            "AliasOfAlias": {"$ref": "#/definitions/Alias", "type": "integer"}
        }});
        let validator = Validator::new(RefResolver::new(&root), ValidationConfig::default());
        let node = SchemaNode::new("#/definitions/AliasOfAlias", &root["definitions"]["AliasOfAlias"]);
        // The sibling `type` is ignored
        assert!(validator.is_valid(&json!("x"), node).unwrap());
        assert!(!validator.is_valid(&json!(1), node).unwrap());
    }

    #[test]
    fn test_instance_path_display() {
        let mut path = InstancePath::root();
        assert_eq!(path.to_string(), "object");
        path.push_index(0);
        assert_eq!(path.to_string(), "[0]");
        path.pop();
        path.push_property("a");
        path.push_property("b-c");
        path.push_index(2);
        path.push_property("d");
        assert_eq!(path.to_string(), "a['b-c'][2].d");
    }
}
