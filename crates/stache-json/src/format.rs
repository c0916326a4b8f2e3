//! Value formatting, truthiness and HTML escaping.

use std::io::Write;

use serde_json::Value;
use stache::{Result, SBuf};

/// Formats a JSON value as template output.
///
/// Strings are borrowed as they are. Numbers and booleans use their display
/// form, null is empty and arrays or objects render as compact JSON.
pub fn format_value(value: &Value) -> SBuf<'_> {
    match value {
        Value::String(s) => SBuf::borrowed(s),
        Value::Number(n) => SBuf::owned(n.to_string()),
        Value::Bool(b) => SBuf::owned(b.to_string()),
        Value::Null => SBuf::empty(),
        Value::Array(_) | Value::Object(_) => SBuf::owned(value.to_string()),
    }
}

/// Whether a section on this value renders.
///
/// Null, `false`, zero, the empty string and the empty array are falsy.
/// Objects are always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Writes `text` with `&`, `<`, `>` and `"` replaced by entities.
pub fn write_escaped(sink: &mut dyn Write, text: &str) -> Result<()> {
    let mut last = 0;
    for (i, byte) in text.bytes().enumerate() {
        let entity: &[u8] = match byte {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            _ => continue,
        };
        sink.write_all(&text.as_bytes()[last..i])?;
        sink.write_all(entity)?;
        last = i + 1;
    }
    sink.write_all(&text.as_bytes()[last..])?;
    Ok(())
}
