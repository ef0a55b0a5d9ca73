use serde::Deserialize;
use serde_json::error::Category;
use serde_json::Value;

use crate::error::{SectionError, SectionResult};

/// Parse `text` as one complete JSON document and return its nesting depth.
///
/// Scalars have depth 0, empty containers depth 1, and a non-empty container
/// is one deeper than its deepest child.
pub fn analyze(text: &str, max_depth: usize) -> SectionResult<usize> {
    let value = parse(text).map_err(classify)?;
    let depth = depth_of(&value, max_depth);
    dismantle(value);
    depth
}

/// Strict parse with no parser-side nesting cap; the stack grows on the heap
/// for deep documents.
fn parse(text: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

fn classify(err: serde_json::Error) -> SectionError {
    match err.classify() {
        Category::Syntax | Category::Eof | Category::Data => SectionError::JsonParse {
            message: err.to_string(),
        },
        Category::Io => SectionError::Internal(format!("unexpected JSON reader failure: {err}")),
    }
}

/// Depth of a parsed tree, computed with an explicit work stack.
///
/// The depth of a tree equals the nesting level of its deepest container,
/// counting the container itself.
pub fn depth_of(value: &Value, max_depth: usize) -> SectionResult<usize> {
    let mut deepest = 0;
    let mut pending: Vec<(&Value, usize)> = vec![(value, 1)];

    while let Some((node, level)) = pending.pop() {
        if !matches!(node, Value::Array(_) | Value::Object(_)) {
            continue;
        }
        if level > max_depth {
            return Err(SectionError::JsonDepthLimit { limit: max_depth });
        }
        deepest = deepest.max(level);
        match node {
            Value::Array(items) => pending.extend(items.iter().map(|v| (v, level + 1))),
            Value::Object(map) => pending.extend(map.values().map(|v| (v, level + 1))),
            _ => {}
        }
    }

    Ok(deepest)
}

/// Drop a tree one node at a time; `Value`'s own drop recurses per level.
fn dismantle(value: Value) {
    let mut pending = vec![value];
    while let Some(node) = pending.pop() {
        match node {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}
