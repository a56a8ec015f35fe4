//! Layout decoding: the outer JSON tree, and on-demand parsing of the
//! JSON-encoded string sub-documents nested inside each visual.

pub mod walk;

use serde_json::Value;

use crate::error::PbixError;

/// The four sub-document fields a visual may carry as JSON-encoded strings.
pub const NESTED_FIELDS: [&str; 4] = ["config", "filters", "query", "dataTransforms"];

/// Parse the outer layout document from its decoded UTF-16 text.
pub fn parse_layout(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Serialize the outer layout tree back to text for re-encoding into the container.
pub fn serialize_layout(tree: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(tree)
}

/// If `visual` carries `field` (one of [`NESTED_FIELDS`]) as a string, parse
/// it as JSON. Returns `Ok(None)` if the field is absent — this is a normal
/// schema-drift no-op, not an error.
pub fn decode_nested(visual: &Value, field: &str) -> Result<Option<Value>, serde_json::Error> {
    match visual.get(field).and_then(Value::as_str) {
        Some(s) => Ok(Some(serde_json::from_str(s)?)),
        None => Ok(None),
    }
}

/// Serialize `value` back into its JSON-encoded string form for storage
/// under `field` on a visual record.
pub fn encode_nested(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Produce a deep-unescaped, read-only mirror of `tree` for field inventory.
///
/// The layout nests JSON-encoded strings inside JSON; this view collapses
/// those nested encodings by textual substitution (never structural
/// parsing) so that `$..` style queries can cross sub-document boundaries.
/// It MUST NOT be used as a basis for mutation: the substitutions are
/// lossy with respect to which characters were originally escaped.
pub fn full_json_view(tree: &Value) -> Result<Value, PbixError> {
    let mut text =
        serde_json::to_string(tree).map_err(|source| PbixError::FullJsonView { source })?;

    text.retain(|c| !matches!(c, '\u{0}' | '\u{19}' | '\u{1c}' | '\u{1d}'));

    let substitutions: [(&str, &str); 6] = [
        ("\"[", "["),
        ("]\"", "]"),
        ("\"{", "{"),
        ("}\"", "}"),
        ("\\\\", "\\"),
        ("\\\"", "\""),
    ];
    for (from, to) in substitutions {
        text = text.replace(from, to);
    }

    serde_json::from_str(&text).map_err(|source| PbixError::FullJsonView { source })
}
