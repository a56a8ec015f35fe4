//! Config sub-document rewriter (§4.3 Config).

use serde_json::Value;

use crate::query::{self, RewriteFields};
use crate::visual::objects;

/// Apply the §4.3 Config rewrites to a decoded `config` sub-document.
///
/// Order matters: `projections` is rewritten last because the earlier
/// steps (`columnProperties`, `objects.*`, `objects.dataPoint`) key off the
/// old qualified/field values that projections also carries.
pub fn rewrite(config: &mut Value, f: &RewriteFields) {
    let Some(single_visual) = config.get_mut("singleVisual") else {
        return;
    };

    if let Some(prototype_query) = single_visual.get_mut("prototypeQuery") {
        query::rewrite(prototype_query, f);
    }

    rewrite_column_properties(single_visual, f.old_qualified, f.new_qualified);
    if let Some(obj) = single_visual.get_mut("objects") {
        objects::rewrite_selector_metadata(obj, f.old_qualified, f.new_qualified);
        objects::rewrite_datapoints(obj, f.old_table, f.new_table, f.old_field, f.new_field);
    }

    // Table field measures act as ids — rewritten last.
    rewrite_projections(single_visual, f.old_qualified, f.new_qualified);
}

fn rewrite_column_properties(single_visual: &mut Value, old_qualified: &str, new_qualified: &str) {
    let Some(column_properties) = single_visual
        .get_mut("columnProperties")
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    if let Some(value) = column_properties.remove(old_qualified) {
        column_properties.insert(new_qualified.to_string(), value);
    }
}

fn rewrite_projections(single_visual: &mut Value, old_qualified: &str, new_qualified: &str) {
    let Some(projections) = single_visual
        .get_mut("projections")
        .and_then(Value::as_object_mut)
    else {
        return;
    };
    for (_, entries) in projections.iter_mut() {
        let Some(entries) = entries.as_array_mut() else {
            continue;
        };
        for entry in entries.iter_mut() {
            if entry.get("queryRef").and_then(Value::as_str) == Some(old_qualified) {
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("queryRef".to_string(), Value::String(new_qualified.to_string()));
                }
            }
        }
    }
}
