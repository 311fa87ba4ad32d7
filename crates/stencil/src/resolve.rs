//! Dotted property-path resolution over input values.
//!
//! Input models are serialized to [`serde_json::Value`] at the render
//! boundary, so resolution is a walk over JSON shapes. Two failure modes
//! are deliberately distinct:
//!
//! - traversal through (or ending on) a **null** value is not an error: it
//!   yields `None`, which the renderer turns into the literal directive
//!   text;
//! - a lookup on a **present** value that lacks the member is a hard
//!   [`TemplateError::PropertyResolution`].

use serde_json::Value;

use crate::error::TemplateError;

/// Resolves a dotted `path` against `root`, one segment at a time.
///
/// Returns `Ok(None)` when resolution short-circuits through a null value
/// or when the final value is itself null. Array elements can be addressed
/// by numeric segment (`Items.0.Name`).
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Result<Option<&'a Value>, TemplateError> {
    let mut current = root;
    for segment in path.split('.') {
        if current.is_null() {
            return Ok(None);
        }
        current = lookup(current, segment)?;
    }
    if current.is_null() {
        Ok(None)
    } else {
        Ok(Some(current))
    }
}

fn lookup<'a>(value: &'a Value, member: &str) -> Result<&'a Value, TemplateError> {
    let found = match value {
        Value::Object(map) => map.get(member),
        Value::Array(items) => member.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };
    found.ok_or_else(|| TemplateError::PropertyResolution {
        property: member.to_string(),
        type_name: type_name(value).to_string(),
    })
}

/// A short shape name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Formats a resolved value for text output.
///
/// Strings are emitted raw (no quotes), numbers and booleans via their
/// display form, and arrays/objects as JSON text.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
