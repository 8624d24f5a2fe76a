// src/api/entity.rs
// =============================================================================
// This module turns raw ICD-API JSON into flat Entity records.
//
// The API serves JSON-LD. Text fields come in two shapes:
//   "title": "Cholera"
//   "title": { "@language": "en", "@value": "Cholera" }
// Both are resolved here into a plain String, so nothing past this module
// has to care which shape the server picked.
//
// Extraction never fails: a missing or oddly-typed field becomes "".
//
// Rust concepts:
// - #[serde(rename = "...")]: Rust fields are snake_case, the CSV columns
//   keep the API's camelCase names (browserUrl, codingNote, isLeaf)
// - serialize_with: custom output for one field (bool -> "True"/"False")
// - Option combinators: get().and_then().unwrap_or_default() walks JSON
//   without a single panic
// - let-else: bail out early when a field isn't the shape we need
// =============================================================================

use serde::{Serialize, Serializer};
use serde_json::Value;

/// One node of the classification tree, flattened for CSV output.
///
/// Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub code: String,
    pub title: String,
    pub definition: String,
    /// `id` of the entity whose child list linked here; empty for roots
    pub parent: String,
    #[serde(rename = "browserUrl")]
    pub browser_url: String,
    #[serde(rename = "codingNote")]
    pub coding_note: String,
    /// Alternate labels joined with "; "
    pub synonyms: String,
    pub exclusions: String,
    pub inclusions: String,
    #[serde(rename = "isLeaf", serialize_with = "serialize_leaf_flag")]
    pub is_leaf: bool,
}

// Downstream loaders expect the capitalized "True"/"False" spelling
fn serialize_leaf_flag<S: Serializer>(is_leaf: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(leaf_flag(*is_leaf))
}

pub fn leaf_flag(is_leaf: bool) -> &'static str {
    if is_leaf {
        "True"
    } else {
        "False"
    }
}

/// A localizable text field as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelValue {
    /// `"title": "Cholera"`
    Plain(String),
    /// `"title": {"@value": "Cholera"}`; an object without `@value` holds ""
    Localized(String),
    /// Missing, null, or some other JSON type
    Absent,
}

impl LabelValue {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(text)) => LabelValue::Plain(text.clone()),
            Some(Value::Object(map)) => {
                let text = map.get("@value").and_then(Value::as_str).unwrap_or_default();
                LabelValue::Localized(text.to_string())
            }
            _ => LabelValue::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, LabelValue::Absent)
    }

    pub fn into_text(self) -> String {
        match self {
            LabelValue::Plain(text) | LabelValue::Localized(text) => text,
            LabelValue::Absent => String::new(),
        }
    }
}

/// Maps one API node onto an [`Entity`].
///
/// `parent_id` is the id of the node whose child list contained this one.
pub fn extract_entity(data: &Value, parent_id: &str) -> Entity {
    Entity {
        id: string_field(data, "@id"),
        code: string_field(data, "code"),
        title: label_field(data, "title"),
        definition: label_field(data, "definition"),
        parent: parent_id.to_string(),
        browser_url: string_field(data, "browserUrl"),
        coding_note: label_field(data, "codingNote"),
        synonyms: synonym_labels(data).join("; "),
        // Not populated from the API; the columns are kept for the loader schema
        exclusions: String::new(),
        inclusions: String::new(),
        is_leaf: child_list(data).is_empty(),
    }
}

/// Child URIs of a node, in server order.
///
/// Entries that are not strings are skipped.
pub fn child_uris(data: &Value) -> Vec<String> {
    child_list(data)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn child_list(data: &Value) -> &[Value] {
    data.get("child")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn string_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn label_field(data: &Value, key: &str) -> String {
    LabelValue::from_json(data.get(key)).into_text()
}

// Each synonym is {"label": <string or {"@value": ...}>}
fn synonym_labels(data: &Value) -> Vec<String> {
    let Some(synonyms) = data.get("synonym").and_then(Value::as_array) else {
        return Vec::new();
    };

    synonyms
        .iter()
        .filter_map(|synonym| synonym.as_object())
        .filter_map(|synonym| {
            let label = LabelValue::from_json(synonym.get("label"));
            if label.is_absent() {
                None
            } else {
                Some(label.into_text())
            }
        })
        .collect()
}
