//! Reference Resolver
//!
//! Dereferences local `$ref` pointers (`#/definitions/X`,
//! `#/components/schemas/X`, or any other `#/...` fragment) against the
//! document. Pointers currently being resolved are kept on an explicit
//! [`ResolutionStack`]; meeting one of them again is a cycle and fails fast.
//! Nothing is inlined: [`RefResolver::verify`] walks the reference graph once
//! and evaluation follows each `$ref` where it meets it.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::{Result, SchemaError};
use crate::schema::{ref_target, subschemas, SchemaNode};

/// Pointers in the middle of being resolved, outermost first
#[derive(Debug, Default, Clone)]
pub struct ResolutionStack<'a> {
    pointers: Vec<&'a str>,
}

impl<'a> ResolutionStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack seeded with the pointer of the schema being resolved
    pub fn rooted(pointer: &'a str) -> Self {
        Self {
            pointers: vec![pointer],
        }
    }

    /// Enter `pointer`, failing if it is already in progress
    pub fn push(&mut self, pointer: &'a str) -> Result<()> {
        if self.pointers.contains(&pointer) {
            let mut chain: Vec<String> = self.pointers.iter().map(|p| p.to_string()).collect();
            chain.push(pointer.to_string());
            return Err(SchemaError::RefCycle { chain });
        }
        self.pointers.push(pointer);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<&'a str> {
        self.pointers.pop()
    }

    pub fn depth(&self) -> usize {
        self.pointers.len()
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.pointers.iter().any(|p| *p == pointer)
    }
}

/// Resolves pointers against one document root
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The node `pointer` designates. One step only; the result may itself be a `$ref`.
    pub fn lookup(&self, pointer: &'a str) -> Result<SchemaNode<'a>> {
        let unresolvable = || SchemaError::UnresolvableRef {
            pointer: pointer.to_string(),
        };

        let fragment = pointer.strip_prefix('#').ok_or_else(unresolvable)?;
        let fragment = percent_decode(fragment).ok_or_else(unresolvable)?;
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(unresolvable());
        }

        let value = self.root.pointer(&fragment).ok_or_else(unresolvable)?;
        Ok(SchemaNode::new(pointer, value))
    }

    /// Follow a chain of `$ref`s from `node` to the first concrete node
    pub fn resolve(
        &self,
        node: SchemaNode<'a>,
        stack: &mut ResolutionStack<'a>,
    ) -> Result<SchemaNode<'a>> {
        let depth = stack.depth();
        let mut current = node;
        while let Some(target) = current.ref_target() {
            stack.push(target)?;
            current = self.lookup(target)?;
        }
        while stack.depth() > depth {
            stack.pop();
        }
        Ok(current)
    }

    /// Check that every `$ref` reachable from `node` through schema positions
    /// resolves and that none of them loops back onto a pointer still being
    /// resolved. Each target is walked once, however many places refer to it.
    pub fn verify(&self, node: SchemaNode<'a>) -> Result<()> {
        let mut stack = ResolutionStack::rooted(node.pointer());
        let mut finished = HashSet::new();
        self.verify_value(node.value(), &mut stack, &mut finished)
    }

    fn verify_value(
        &self,
        value: &'a Value,
        stack: &mut ResolutionStack<'a>,
        finished: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if let Some(target) = ref_target(value) {
            // Siblings of $ref are ignored, as in OpenAPI 2 and 3.0
            if finished.contains(target) {
                return Ok(());
            }
            stack.push(target)?;
            let resolved = self.lookup(target)?;
            self.verify_value(resolved.value(), stack, finished)?;
            stack.pop();
            finished.insert(target);
            return Ok(());
        }

        for sub in subschemas(value) {
            self.verify_value(sub.value, stack, finished)?;
        }
        Ok(())
    }
}

/// Decode `%XX` escapes in a URI fragment
fn percent_decode(fragment: &str) -> Option<String> {
    if !fragment.contains('%') {
        return Some(fragment.to_string());
    }

    let bytes = fragment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = fragment.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
