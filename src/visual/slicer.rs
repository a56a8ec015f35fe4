//! Slicer reset (§4.5): clear the "inverted selection" ("All" items)
//! marker on slicers that have no explicit selection filter.

use serde_json::Value;

/// If `config.singleVisual.objects.data[*].properties.isInvertedSelectionMode`
/// exists and no `objects.general[*].properties.filter` is set, remove the
/// `isInvertedSelectionMode` key. Returns `true` if `config` was mutated.
pub fn reset(config: &mut Value) -> bool {
    let Some(single_visual) = config.get_mut("singleVisual") else {
        return false;
    };
    let has_general_filter = single_visual
        .get("objects")
        .and_then(|o| o.get("general"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .any(|e| e.get("properties").and_then(|p| p.get("filter")).is_some())
        })
        .unwrap_or(false);
    if has_general_filter {
        return false;
    }

    let Some(data_entries) = single_visual
        .get_mut("objects")
        .and_then(|o| o.get_mut("data"))
        .and_then(Value::as_array_mut)
    else {
        return false;
    };

    let mut mutated = false;
    for entry in data_entries.iter_mut() {
        if let Some(properties) = entry.get_mut("properties").and_then(Value::as_object_mut) {
            if properties.remove("isInvertedSelectionMode").is_some() {
                mutated = true;
            }
        }
    }
    mutated
}
