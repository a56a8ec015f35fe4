//! Field inventory (SPEC_FULL.md §D.1): advisory lookup of which candidate
//! fields a report's full-JSON view mentions.
//!
//! Ported from the original `PBIFile.find_instances` / `Report.find_instances`:
//! the field set is the union of every `filters[*].expression.Measure.Property`
//! and `config.singleVisual.projections[*].*[*].queryRef` value found across
//! all sections/visualContainers of the §4.1 full-JSON view. This is a
//! read-only, advisory view (§9) — it may miss or include fields the
//! mutation path treats differently.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::PbixError;
use crate::layout;

/// The set of fields (qualified `Table.Field` for projections, bare
/// measure names for filter properties) referenced anywhere in `tree`.
pub fn field_set(tree: &Value) -> Result<BTreeSet<String>, PbixError> {
    let view = layout::full_json_view(tree)?;

    let mut fields = BTreeSet::new();
    for section in view.get("sections").and_then(Value::as_array).into_iter().flatten() {
        for container in section
            .get("visualContainers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let filter_properties = container
                .get("filters")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|entry| entry.get("expression")?.get("Measure")?.get("Property")?.as_str());
            for property in filter_properties {
                fields.insert(property.to_string());
            }
            let query_refs = container
                .get("config")
                .and_then(|c| c.get("singleVisual"))
                .and_then(|sv| sv.get("projections"))
                .and_then(Value::as_object)
                .into_iter()
                .flatten()
                .flat_map(|(_, entries)| entries.as_array().into_iter().flatten())
                .filter_map(|entry| entry.get("queryRef")?.as_str());
            for query_ref in query_refs {
                fields.insert(query_ref.to_string());
            }
        }
    }
    Ok(fields)
}

/// Check each of `candidates` against `fields` (as returned by
/// [`field_set`]). A candidate containing a `.` is matched against the
/// qualified set directly; a bare field name is matched against every
/// qualified field's suffix after its last `.`.
///
/// Returns only the candidates found present, mirroring the original's
/// `matches` dict (which never records a `false` entry).
pub fn find_instances(fields: &BTreeSet<String>, candidates: &[String]) -> Vec<String> {
    let bare_fields: BTreeSet<&str> = fields
        .iter()
        .map(|f| f.rsplit('.').next().unwrap_or(f.as_str()))
        .collect();

    candidates
        .iter()
        .filter(|candidate| {
            if candidate.contains('.') {
                fields.contains(candidate.as_str())
            } else {
                bare_fields.contains(candidate.as_str())
            }
        })
        .cloned()
        .collect()
}
