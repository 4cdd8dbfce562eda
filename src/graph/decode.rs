//! Decoding of FalkorDB's compact reply format.
//!
//! A `GRAPH.QUERY ... --compact` reply is a three-part array: column
//! headers, result rows and trailing execution statistics. Headers and row
//! cells are `[type-tag, value]` pairs; the tag is positional metadata we
//! drop, and nested containers carry tagged elements all the way down.

use redis::Value;
use std::collections::HashMap;

/// Query result as a list of rows, where each row is a map of column names
/// to values.
pub type QueryResult = Vec<HashMap<String, serde_json::Value>>;

/// Decode a raw compact reply into named records.
///
/// Replies missing the header or row section (write-only queries return
/// statistics alone) decode to an empty sequence rather than an error.
pub fn decode_reply(raw: &Value) -> QueryResult {
    let parts = match raw {
        Value::Array(parts) if parts.len() >= 2 => parts,
        _ => return Vec::new(),
    };

    let columns = decode_header(&parts[0]);
    let rows = match &parts[1] {
        Value::Array(rows) => rows,
        _ => return Vec::new(),
    };

    rows.iter()
        .filter_map(|row| match row {
            Value::Array(cells) => {
                let mut record = HashMap::new();
                for (i, cell) in cells.iter().enumerate() {
                    if let Some(name) = columns.get(i) {
                        record.insert(name.clone(), cell_to_json(cell));
                    }
                }
                Some(record)
            }
            _ => None,
        })
        .collect()
}

/// Extract column names from the header section, dropping each entry's
/// leading type tag.
fn decode_header(header: &Value) -> Vec<String> {
    let entries = match header {
        Value::Array(entries) => entries,
        _ => return Vec::new(),
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::Array(pair) if pair.len() == 2 => value_to_string(&pair[1]),
            other => value_to_string(other),
        })
        .collect()
}

// Compact value-type tags. Only the scalar and container tags matter for
// conversion; anything else falls through to the generic path.
const TAG_NULL: i64 = 1;
const TAG_STRING: i64 = 2;
const TAG_INTEGER: i64 = 3;
const TAG_BOOLEAN: i64 = 4;
const TAG_DOUBLE: i64 = 5;
const TAG_ARRAY: i64 = 6;

/// Convert a row cell to JSON. Cells are `[tag, value]` pairs; the tag
/// steers conversion (doubles and booleans arrive as bulk strings on the
/// wire) and is dropped from the record. Container values hold tagged
/// pairs recursively.
fn cell_to_json(cell: &Value) -> serde_json::Value {
    let (tag, inner) = match cell {
        Value::Array(pair) if pair.len() == 2 => match pair[0] {
            Value::Int(tag) => (tag, &pair[1]),
            _ => return plain_to_json(cell),
        },
        other => return plain_to_json(other),
    };

    match tag {
        TAG_NULL => serde_json::Value::Null,
        TAG_STRING => serde_json::Value::String(value_to_string(inner)),
        TAG_INTEGER => match inner {
            Value::Int(n) => serde_json::json!(*n),
            other => value_to_string(other)
                .parse::<i64>()
                .map(|n| serde_json::json!(n))
                .unwrap_or(serde_json::Value::Null),
        },
        TAG_BOOLEAN => match inner {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            other => serde_json::Value::Bool(value_to_string(other) == "true"),
        },
        TAG_DOUBLE => match inner {
            Value::Double(f) => serde_json::json!(*f),
            other => value_to_string(other)
                .parse::<f64>()
                .map(|f| serde_json::json!(f))
                .unwrap_or(serde_json::Value::Null),
        },
        TAG_ARRAY => plain_to_json(inner),
        _ => plain_to_json(inner),
    }
}

fn plain_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Int(n) => serde_json::json!(*n),
        Value::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::BulkString(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        Value::SimpleString(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(cell_to_json).collect())
        }
        Value::Map(pairs) => {
            let map: serde_json::Map<String, serde_json::Value> = pairs
                .iter()
                .map(|(k, v)| (value_to_string(k), cell_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
        Value::Okay => serde_json::Value::String("OK".to_string()),
        other => serde_json::Value::String(format!("{:?}", other)),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::BulkString(bytes) => String::from_utf8_lossy(bytes).to_string(),
        Value::SimpleString(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        other => format!("{:?}", other),
    }
}
