//! Parser for the word-root corpus (`wordroot.txt`), a JSON object keyed by
//! root or affix:
//!
//! ```json
//! {
//!   "bene": {
//!     "class": "root",
//!     "origin": "Latin",
//!     "meaning": "good, well",
//!     "function": "",
//!     "example": ["benefit", "benevolent"]
//!   }
//! }
//! ```

use serde_json::{Map, Value};

use crate::error::{ExportError, Result};
use crate::filter::is_valid_word;
use crate::sql::SqlValue;

/// An accepted root record, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RootEntry {
    pub root: String,
    pub class: SqlValue,
    pub origin: SqlValue,
    pub meaning: SqlValue,
    pub function: SqlValue,
    /// String elements of `example`; other element types are dropped.
    pub examples: Vec<String>,
}

/// Converts a record field into a cell. A missing key becomes an empty
/// string, `null` becomes `NULL`, numbers and booleans are written bare and
/// nested arrays or objects as their compact JSON text.
fn field(record: &Map<String, Value>, key: &str) -> SqlValue {
    match record.get(key) {
        None => SqlValue::text(""),
        Some(Value::Null) => SqlValue::Null,
        Some(Value::String(s)) => SqlValue::text(s.as_str()),
        Some(Value::Number(n)) => SqlValue::Bare(n.to_string()),
        Some(Value::Bool(b)) => SqlValue::Bare(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Some(nested) => SqlValue::Text(nested.to_string()),
    }
}

fn examples(record: &Map<String, Value>) -> Vec<String> {
    match record.get("example") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses the corpus, keeping object-shaped values whose key is a valid word.
pub fn parse_roots(text: &str) -> Result<Vec<RootEntry>> {
    let document: Value = serde_json::from_str(text)?;
    let object = match document {
        Value::Object(object) => object,
        other => return Err(ExportError::RootShape(kind(&other))),
    };

    let mut entries = Vec::new();
    for (root, value) in object {
        let Value::Object(record) = value else {
            continue;
        };
        if !is_valid_word(&root) {
            continue;
        }

        entries.push(RootEntry {
            class: field(&record, "class"),
            origin: field(&record, "origin"),
            meaning: field(&record, "meaning"),
            function: field(&record, "function"),
            examples: examples(&record),
            root,
        });
    }

    Ok(entries)
}
