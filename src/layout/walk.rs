//! Hand-written tree walkers over `serde_json::Value`.
//!
//! The layout's sub-documents are untyped JSON trees with field references
//! scattered at varying depths under differently-shaped wrapper keys
//! (`Measure`, `Aggregation`, `Column`, ...). Rather than modelling every
//! shape, the rewriters search and mutate by key name wherever it occurs,
//! the way the original implementation's `$..@[?(...)]` path expressions
//! do.

use serde_json::Value;

/// Depth-first, pre-order walk calling `f` on every object in the tree.
pub fn walk_objects<'a, F: FnMut(&'a serde_json::Map<String, Value>)>(value: &'a Value, f: &mut F) {
    match value {
        Value::Object(map) => {
            f(map);
            for v in map.values() {
                walk_objects(v, f);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                walk_objects(v, f);
            }
        }
        _ => {}
    }
}

/// Depth-first, pre-order walk calling `f` on every object in the tree, mutably.
pub fn walk_objects_mut<F: FnMut(&mut serde_json::Map<String, Value>)>(value: &mut Value, f: &mut F) {
    match value {
        Value::Object(map) => {
            f(map);
            for v in map.values_mut() {
                walk_objects_mut(v, f);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                walk_objects_mut(v, f);
            }
        }
        _ => {}
    }
}

/// True if any object anywhere in `value` has a string value equal to
/// `target` at one of `keys`. Implements the `$..@[?(@.*==X)]` predicate.
pub fn any_value_at_keys_equals(value: &Value, keys: &[&str], target: &str) -> bool {
    let mut found = false;
    walk_objects(value, &mut |map| {
        if found {
            return;
        }
        for key in keys {
            if let Some(Value::String(s)) = map.get(*key) {
                if s == target {
                    found = true;
                    return;
                }
            }
        }
    });
    found
}

/// Collect every string value found at `key` anywhere in `value`.
pub fn collect_strings_at_key(value: &Value, key: &str) -> Vec<String> {
    let mut out = Vec::new();
    walk_objects(value, &mut |map| {
        if let Some(Value::String(s)) = map.get(key) {
            out.push(s.clone());
        }
    });
    out
}

/// True if any string value at `key` anywhere in `value` equals `target`.
pub fn any_string_at_key_equals(value: &Value, key: &str, target: &str) -> bool {
    collect_strings_at_key(value, key).iter().any(|s| s == target)
}

/// Overwrite every string value found at `key` anywhere in `value` with
/// `new_value`, regardless of current content. Returns the number of
/// replacements made.
pub fn set_all_at_key(value: &mut Value, key: &str, new_value: &str) -> usize {
    let mut count = 0usize;
    walk_objects_mut(value, &mut |map| {
        if let Some(v) = map.get_mut(key) {
            if v.is_string() {
                *v = Value::String(new_value.to_string());
                count += 1;
            }
        }
    });
    count
}
