//! Query sub-document rewriter (§4.3 Query).

use serde_json::Value;

use crate::query::{self, RewriteFields};

/// Apply the §4.3 Query rewrites: run the semantic rewriter over every
/// `Commands[*].SemanticQueryDataShapeCommand.Query`.
pub fn rewrite(query_doc: &mut Value, f: &RewriteFields) {
    let Some(commands) = query_doc.get_mut("Commands").and_then(Value::as_array_mut) else {
        return;
    };
    for command in commands.iter_mut() {
        if let Some(semantic_query) = command
            .get_mut("SemanticQueryDataShapeCommand")
            .and_then(|c| c.get_mut("Query"))
        {
            query::rewrite(semantic_query, f);
        }
    }
}
