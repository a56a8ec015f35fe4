//! Filters sub-document rewriter (§4.3 Filters).

use serde_json::Value;

use crate::layout::walk;
use crate::query::{self, RewriteFields};

/// Apply the §4.3 Filters rewrites to a decoded `filters` sub-document (a
/// top-level array of filter entries).
pub fn rewrite(filters: &mut Value, f: &RewriteFields) {
    let Some(entries) = filters.as_array_mut() else {
        return;
    };

    for entry in entries.iter_mut() {
        let matches = entry
            .get("expression")
            .map(|e| walk::any_string_at_key_equals(e, "Property", f.old_field))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        if let Some(filter_query) = entry.get_mut("filter") {
            query::rewrite(filter_query, f);
        }

        if let Some(expression) = entry.get_mut("expression") {
            walk::set_all_at_key(expression, "Entity", f.new_table);
            walk::set_all_at_key(expression, "Property", f.new_field);
        }
    }
}
