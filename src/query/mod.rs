//! Semantic query rewriter (§4.2): rewrites a `{From, Select, Where?,
//! OrderBy?}` block in place so that a `Table.Field` reference is relocated
//! to a new table/field, regenerating and pruning the alias table as
//! needed.
//!
//! Step order is part of the contract: the synthetic `Name` identifier on
//! `Select` entries is rewritten LAST because every other step keys off
//! its old value to find the rows it must touch.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::layout::walk;

/// The six identifiers a rewrite is parameterized on.
pub struct RewriteFields<'a> {
    pub old_qualified: &'a str,
    pub new_qualified: &'a str,
    pub old_table: &'a str,
    pub new_table: &'a str,
    pub old_field: &'a str,
    pub new_field: &'a str,
}

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[^0-9]").unwrap());

/// Rewrite a semantic query `{From, Select, Where?, OrderBy?}` in place.
///
/// No-op safe: a query missing `Where`/`OrderBy`, or whose `Select` has no
/// row matching `old_qualified`, is left exactly as found past the steps
/// that don't apply.
pub fn rewrite(query: &mut Value, f: &RewriteFields) {
    prune_stale_from(query, f.old_table, f.old_qualified);
    let new_alias = ensure_from_alias(query, f.new_table);
    update_select_aliases(query, f.old_qualified, &new_alias);
    update_select_fields(query, f.old_qualified, f.new_field);
    update_orderby(query, f.old_field, f.new_field, &new_alias);
    update_where(query, f.old_field, f.new_field, &new_alias);
    // Table field measures act as ids for siblings — rewritten last.
    update_select_names(query, f.old_qualified, f.new_qualified);
}

fn from_array(query: &Value) -> Vec<Value> {
    query
        .get("From")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn from_alias_for_entity(query: &Value, entity: &str) -> Option<String> {
    from_array(query).iter().find_map(|entry| {
        if entry.get("Entity").and_then(Value::as_str) == Some(entity) {
            entry.get("Name").and_then(Value::as_str).map(str::to_string)
        } else {
            None
        }
    })
}

/// Select-entry sources referenced anywhere other than the row matching
/// `old_qualified`.
fn select_sources_excluding(query: &Value, old_qualified: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(select) = query.get("Select").and_then(Value::as_array) {
        for entry in select {
            if entry.get("Name").and_then(Value::as_str) == Some(old_qualified) {
                continue;
            }
            out.extend(walk::collect_strings_at_key(entry, "Source"));
        }
    }
    out
}

fn where_sources(query: &Value) -> Vec<String> {
    query
        .get("Where")
        .map(|w| walk::collect_strings_at_key(w, "Source"))
        .unwrap_or_default()
}

/// Step 1: drop the old table's alias from `From` if nothing surviving
/// references it.
fn prune_stale_from(query: &mut Value, old_table: &str, old_qualified: &str) {
    let Some(alias_old) = from_alias_for_entity(query, old_table) else {
        return;
    };
    let selects = select_sources_excluding(query, old_qualified);
    let wheres = where_sources(query);
    if selects.contains(&alias_old) || wheres.contains(&alias_old) {
        return;
    }
    if let Some(from) = query.get_mut("From").and_then(Value::as_array_mut) {
        from.retain(|entry| entry.get("Name").and_then(Value::as_str) != Some(alias_old.as_str()));
    }
}

/// Step 2: find or create the alias for the new table, returning it.
fn ensure_from_alias(query: &mut Value, new_table: &str) -> String {
    if let Some(existing) = from_alias_for_entity(query, new_table) {
        return existing;
    }
    let alias = generate_alias(query, new_table);
    let entry = json!({"Name": alias, "Entity": new_table, "Type": 0});
    match query.get_mut("From").and_then(Value::as_array_mut) {
        Some(from) => from.push(entry),
        None => {
            if let Some(obj) = query.as_object_mut() {
                obj.insert("From".to_string(), Value::Array(vec![entry]));
            }
        }
    }
    alias
}

/// Generate a fresh alias: the lowercased first character of `new_table`,
/// disambiguated by one plus the maximum numeric suffix among existing
/// aliases sharing that first character.
fn generate_alias(query: &Value, new_table: &str) -> String {
    let first_char = new_table
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_default();

    let names = from_array(query);
    let max_suffix = names
        .iter()
        .filter_map(|entry| entry.get("Name").and_then(Value::as_str))
        .filter(|name| name.starts_with(&first_char))
        .map(|name| {
            let digits = NON_DIGIT.replace_all(name, "0");
            digits.parse::<i64>().unwrap_or(0)
        })
        .max();

    match max_suffix {
        Some(max) => format!("{first_char}{}", max + 1),
        None => first_char,
    }
}

/// Step 3: rewrite the source alias on the `Select` row(s) keyed by the
/// old qualified name.
fn update_select_aliases(query: &mut Value, old_qualified: &str, new_alias: &str) {
    if let Some(select) = query.get_mut("Select").and_then(Value::as_array_mut) {
        for entry in select.iter_mut() {
            if entry.get("Name").and_then(Value::as_str) == Some(old_qualified) {
                walk::set_all_at_key(entry, "Source", new_alias);
            }
        }
    }
}

/// Step 4: rewrite the field name on the `Select` row(s) keyed by the old
/// qualified name.
fn update_select_fields(query: &mut Value, old_qualified: &str, new_field: &str) {
    if let Some(select) = query.get_mut("Select").and_then(Value::as_array_mut) {
        for entry in select.iter_mut() {
            if entry.get("Name").and_then(Value::as_str) == Some(old_qualified) {
                walk::set_all_at_key(entry, "Property", new_field);
            }
        }
    }
}

/// Step 5: rewrite `OrderBy` entries whose `Property` equals `old_field`.
fn update_orderby(query: &mut Value, old_field: &str, new_field: &str, new_alias: &str) {
    if let Some(order_by) = query.get_mut("OrderBy").and_then(Value::as_array_mut) {
        for entry in order_by.iter_mut() {
            let Some(expression) = entry.get_mut("Expression") else {
                continue;
            };
            if walk::any_string_at_key_equals(expression, "Property", old_field) {
                walk::set_all_at_key(expression, "Source", new_alias);
                walk::set_all_at_key(expression, "Property", new_field);
            }
        }
    }
}

/// Step 6: for each `Where` condition with any `Property == old_field`,
/// rewrite every `Source` and `Property` found in that condition.
fn update_where(query: &mut Value, old_field: &str, new_field: &str, new_alias: &str) {
    let Some(conditions) = query.get_mut("Where").and_then(Value::as_array_mut) else {
        return;
    };
    for condition in conditions.iter_mut() {
        let Some(obj) = condition.as_object_mut() else {
            continue;
        };
        for setting in obj.values_mut() {
            if walk::any_string_at_key_equals(setting, "Property", old_field) {
                walk::set_all_at_key(setting, "Source", new_alias);
                walk::set_all_at_key(setting, "Property", new_field);
            }
        }
    }
}

/// Step 7 (LAST): rewrite the `Name` identifier on the `Select` row(s)
/// keyed by the old qualified name.
fn update_select_names(query: &mut Value, old_qualified: &str, new_qualified: &str) {
    if let Some(select) = query.get_mut("Select").and_then(Value::as_array_mut) {
        for entry in select.iter_mut() {
            if entry.get("Name").and_then(Value::as_str) == Some(old_qualified) {
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("Name".to_string(), Value::String(new_qualified.to_string()));
                }
            }
        }
    }
}
