//! Payload placeholder rendering.
//!
//! Handler parameters may reference trigger payload values with
//! `{{ path.to.value }}` placeholders. Rendering is deliberately small:
//! dot-paths only, no expressions, no filters.

use serde_json::Value;

/// Resolve a dot-path against a JSON value. Array indices are numeric
/// segments (`items.0.sku`).
pub(crate) fn resolve_path(root: &Value, path: &str) -> Option<Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        match current {
            Value::Object(map) => current = map.get(segment)?,
            Value::Array(items) => {
                let index = segment.parse::<usize>().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current.clone())
}

/// Render `{{ path }}` placeholders in `text` against `payload`.
///
/// Strings substitute raw; other values substitute as compact JSON. A
/// placeholder whose path does not resolve is left untouched, so the gap
/// is visible in the delivered message rather than silently blank.
pub fn render(text: &str, payload: &Value) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let path = after[..end].trim();
                match resolve_path(payload, path) {
                    Some(Value::String(s)) => out.push_str(&s),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push_str(&rest[start..start + 2 + end + 2]);
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated placeholder: emit verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render every string leaf of a JSON value in place.
pub fn render_value(value: &Value, payload: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(render(s, payload)),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, payload)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, payload)))
                .collect(),
        ),
        other => other.clone(),
    }
}
