//! Shared `objects.*` rewrites used by both Config and Data Transforms
//! (§4.3): selector-metadata renaming and `dataPoint` field/table rewrites.

use serde_json::Value;

use crate::layout::walk;

/// Rewrite `objects.*[?selector.metadata==old_qualified].selector.metadata`
/// to `new_qualified`, given the `objects` map itself.
pub fn rewrite_selector_metadata(objects: &mut Value, old_qualified: &str, new_qualified: &str) {
    let Some(objects) = objects.as_object_mut() else {
        return;
    };
    for (_, entries) in objects.iter_mut() {
        let Some(entries) = entries.as_array_mut() else {
            continue;
        };
        for entry in entries.iter_mut() {
            let matches = entry
                .get("selector")
                .and_then(|s| s.get("metadata"))
                .and_then(Value::as_str)
                == Some(old_qualified);
            if matches {
                if let Some(selector) = entry.get_mut("selector").and_then(Value::as_object_mut) {
                    selector.insert("metadata".to_string(), Value::String(new_qualified.to_string()));
                }
            }
        }
    }
}

/// Rewrite `objects.dataPoint` entries whose `Property == old_field` and
/// whose sibling `Expression.SourceRef.Entity == old_table`, given the
/// `objects` map itself.
pub fn rewrite_datapoints(
    objects: &mut Value,
    old_table: &str,
    new_table: &str,
    old_field: &str,
    new_field: &str,
) {
    let Some(data_point) = objects.get_mut("dataPoint") else {
        return;
    };

    walk::walk_objects_mut(data_point, &mut |map| {
        let is_target_field = matches!(map.get("Property"), Some(Value::String(s)) if s == old_field);
        if !is_target_field {
            return;
        }
        let is_target_table = map
            .get("Expression")
            .and_then(|e| e.get("SourceRef"))
            .and_then(|s| s.get("Entity"))
            .and_then(Value::as_str)
            == Some(old_table);
        if !is_target_table {
            return;
        }
        map.insert("Property".to_string(), Value::String(new_field.to_string()));
        if let Some(entity) = map
            .get_mut("Expression")
            .and_then(|e| e.get_mut("SourceRef"))
            .and_then(Value::as_object_mut)
        {
            entity.insert("Entity".to_string(), Value::String(new_table.to_string()));
        }
    });
}
