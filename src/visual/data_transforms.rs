//! Data Transforms sub-document rewriter (§4.3 Data Transforms).

use serde_json::Value;

use crate::layout::walk;
use crate::query::RewriteFields;
use crate::visual::objects;

/// Apply the §4.3 Data Transforms rewrites to a decoded `dataTransforms`
/// sub-document.
///
/// Order matters: `selects[*].queryName` and `queryMetadata.Select[*].Name`
/// are renamed last because steps 1-4 key off the old qualified/field
/// values those same rows carry.
pub fn rewrite(transforms: &mut Value, f: &RewriteFields) {
    if let Some(obj) = transforms.get_mut("objects") {
        objects::rewrite_selector_metadata(obj, f.old_qualified, f.new_qualified);
        objects::rewrite_datapoints(obj, f.old_table, f.new_table, f.old_field, f.new_field);
    }

    rewrite_selects(transforms, f);
    rewrite_query_metadata_filters(transforms, f.old_field, f.new_table, f.new_field);

    // Table field measures act as ids — renamed last.
    rename_select_query_names(transforms, f.old_qualified, f.new_qualified);
    rename_query_metadata_select_names(transforms, f.old_qualified, f.new_qualified);
}

fn rewrite_selects(transforms: &mut Value, f: &RewriteFields) {
    let Some(selects) = transforms.get_mut("selects").and_then(Value::as_array_mut) else {
        return;
    };
    for entry in selects.iter_mut() {
        if entry.get("queryName").and_then(Value::as_str) != Some(f.old_qualified) {
            continue;
        }
        if let Some(expr) = entry.get_mut("expr") {
            walk::set_all_at_key(expr, "Entity", f.new_table);
            walk::set_all_at_key(expr, "Property", f.new_field);
        }
        let display_name_matches =
            entry.get("displayName").and_then(Value::as_str) == Some(f.old_field);
        if display_name_matches {
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("displayName".to_string(), Value::String(f.new_field.to_string()));
            }
        }
    }
}

fn rewrite_query_metadata_filters(
    transforms: &mut Value,
    old_field: &str,
    new_table: &str,
    new_field: &str,
) {
    let Some(filters) = transforms
        .get_mut("queryMetadata")
        .and_then(|q| q.get_mut("Filters"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for entry in filters.iter_mut() {
        let matches = entry
            .get("expression")
            .map(|e| walk::any_string_at_key_equals(e, "Property", old_field))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Some(expression) = entry.get_mut("expression") {
            walk::set_all_at_key(expression, "Entity", new_table);
            walk::set_all_at_key(expression, "Property", new_field);
        }
    }
}

fn rename_select_query_names(transforms: &mut Value, old_qualified: &str, new_qualified: &str) {
    let Some(selects) = transforms.get_mut("selects").and_then(Value::as_array_mut) else {
        return;
    };
    for entry in selects.iter_mut() {
        if entry.get("queryName").and_then(Value::as_str) == Some(old_qualified) {
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("queryName".to_string(), Value::String(new_qualified.to_string()));
            }
        }
    }
}

fn rename_query_metadata_select_names(
    transforms: &mut Value,
    old_qualified: &str,
    new_qualified: &str,
) {
    let Some(selects) = transforms
        .get_mut("queryMetadata")
        .and_then(|q| q.get_mut("Select"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for entry in selects.iter_mut() {
        if entry.get("Name").and_then(Value::as_str) == Some(old_qualified) {
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("Name".to_string(), Value::String(new_qualified.to_string()));
            }
        }
    }
}
