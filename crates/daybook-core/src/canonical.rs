//! Canonical JSON encoding for deterministic serialization.
//!
//! Grammar:
//! - Object keys sorted lexicographically by their literal string form
//! - Arrays preserve source order (sequence order is semantically
//!   significant and is never re-sorted here)
//! - No whitespace
//! - Strings use standard JSON escaping
//! - Numbers use their default decimal text form
//!
//! The canonical encoding is critical: it ensures that semantically equal
//! values produce identical strings (and thus identical hashes) regardless
//! of how the value tree was constructed.

use serde_json::Value;

/// Encode a value tree to its canonical JSON string.
///
/// Pure and total: defined for every `Value`, with no locale or timezone
/// dependence.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Recursively encode a JSON value.
fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sort keys by their literal string form. serde_json's default
            // map already iterates sorted, but the contract must not depend
            // on a feature flag.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[*key]);
            }
            out.push('}');
        }
    }
}

/// Write a JSON string literal with standard escaping.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
