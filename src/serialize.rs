//! Byte-stable JSON rendering.
//!
//! Object keys are sorted at every level, arrays keep their order, nesting is
//! indented by two spaces and the document ends with a newline. Two values
//! that differ only in key order serialize to identical bytes, which keeps
//! manifests and config echoes diffable across builds.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const INDENT: &str = "  ";

#[derive(Debug, Error)]
#[error("value is not representable as JSON: {0}")]
pub struct SerializeError(#[from] serde_json::Error);

pub fn to_deterministic_string<T>(value: &T) -> Result<String, SerializeError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value, 0)?;
    out.push('\n');
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), SerializeError> {
    match value {
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort();
            out.push_str("{\n");
            for (idx, key) in keys.iter().enumerate() {
                push_indent(out, depth + 1);
                out.push_str(&serde_json::to_string(key)?);
                out.push_str(": ");
                write_value(out, &map[key.as_str()], depth + 1)?;
                if idx + 1 < keys.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push_str("[\n");
            for (idx, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1)?;
                if idx + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
