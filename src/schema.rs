//! Schema node views and keyword layout

use serde_json::Value;

use crate::version::escape_pointer_segment;

/// Keywords whose value is a map of name -> subschema
pub(crate) const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties"];

/// Keywords whose value is a list of subschemas
pub(crate) const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Keywords whose value is a single subschema (`items` may also be a list)
pub(crate) const SCHEMA_SINGLE_KEYWORDS: &[&str] =
    &["additionalProperties", "items", "additionalItems", "not"];

/// A schema subtree inside a loaded document.
///
/// Identity is the JSON pointer of its location; the value is borrowed from
/// the document, never copied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaNode<'a> {
    pointer: &'a str,
    value: &'a Value,
}

impl<'a> SchemaNode<'a> {
    pub fn new(pointer: &'a str, value: &'a Value) -> Self {
        Self { pointer, value }
    }

    /// Location within the document, e.g. `#/definitions/Pet`
    pub fn pointer(&self) -> &'a str {
        self.pointer
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Target of a `$ref` on this node, if any
    pub fn ref_target(&self) -> Option<&'a str> {
        ref_target(self.value)
    }
}

pub(crate) fn ref_target(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// A subschema slot inside a schema: where it lives and what it holds
#[derive(Debug)]
pub(crate) struct Subschema<'a> {
    /// Pointer suffix relative to the parent, e.g. `/properties/name`
    pub suffix: String,
    pub value: &'a Value,
}

/// Direct subschemas of `schema`, in declaration order.
///
/// Only schema positions are visited; `enum`, `default`, `example` and
/// vendor extensions are data and never hold subschemas.
pub(crate) fn subschemas(schema: &Value) -> Vec<Subschema<'_>> {
    let mut out = Vec::new();
    let Some(obj) = schema.as_object() else {
        return out;
    };

    for (key, value) in obj {
        let key = key.as_str();
        if SCHEMA_MAP_KEYWORDS.contains(&key) {
            if let Some(map) = value.as_object() {
                for (name, sub) in map {
                    out.push(Subschema {
                        suffix: format!("/{}/{}", key, escape_pointer_segment(name)),
                        value: sub,
                    });
                }
            }
        } else if SCHEMA_LIST_KEYWORDS.contains(&key) {
            if let Some(list) = value.as_array() {
                for (i, sub) in list.iter().enumerate() {
                    out.push(Subschema {
                        suffix: format!("/{}/{}", key, i),
                        value: sub,
                    });
                }
            }
        } else if SCHEMA_SINGLE_KEYWORDS.contains(&key) {
            match value {
                Value::Object(_) => out.push(Subschema {
                    suffix: format!("/{}", key),
                    value,
                }),
                Value::Array(list) if key == "items" => {
                    for (i, sub) in list.iter().enumerate() {
                        out.push(Subschema {
                            suffix: format!("/items/{}", i),
                            value: sub,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subschemas_follow_declaration_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "b": {"type": "string"},
                "a": {"$ref": "#/definitions/A"}
            },
            "allOf": [{"required": ["a"]}],
            "enum": [{"$ref": "not a schema"}],
            "items": [{"type": "string"}, {"type": "integer"}],
            "additionalProperties": false
        });

        let suffixes: Vec<String> = subschemas(&schema).into_iter().map(|s| s.suffix).collect();
        assert_eq!(
            suffixes,
            vec!["/properties/b", "/properties/a", "/allOf/0", "/items/0", "/items/1"]
        );
    }

    #[test]
    fn test_node_ref_target() {
        let value = json!({"$ref": "#/definitions/Pet"});
        let node = SchemaNode::new("#/definitions/Owner/properties/pet", &value);
        assert_eq!(node.ref_target(), Some("#/definitions/Pet"));
        assert_eq!(node.pointer(), "#/definitions/Owner/properties/pet");
    }
}
