//! Cross-module invariant checks for the semantic query rewriter that
//! don't fit naturally in `src/query/mod.rs`'s own unit tests because they
//! exercise the full `RewriteFields` contract chained across two
//! successive rewrites (§8 P4, P5).

use rust_pbix_refactor::query::{self, RewriteFields};
use serde_json::json;

fn from_entries(query: &serde_json::Value) -> Vec<(String, String)> {
    query["From"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["Name"].as_str().unwrap().to_string(),
                e["Entity"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

fn every_source_ref_resolves(query: &serde_json::Value) -> bool {
    let names: std::collections::HashSet<String> =
        from_entries(query).into_iter().map(|(name, _)| name).collect();

    let mut ok = true;
    if let Some(select) = query["Select"].as_array() {
        for entry in select {
            if let Some(source) = entry
                .get("Expression")
                .and_then(|e| e.get("Measure"))
                .and_then(|m| m.get("Expression"))
                .and_then(|e| e.get("SourceRef"))
                .and_then(|s| s.get("Source"))
                .and_then(|s| s.as_str())
            {
                ok &= names.contains(source);
            }
        }
    }
    ok
}

#[test]
fn p4_source_ref_always_resolves_after_rewrite() {
    let mut query = json!({
        "From": [{"Name": "s", "Entity": "Sales", "Type": 0}],
        "Select": [{
            "Name": "Sales.Qty",
            "Expression": {"Measure": {"Expression": {"SourceRef": {"Source": "s"}}, "Property": "Qty"}}
        }]
    });

    let f = RewriteFields {
        old_qualified: "Sales.Qty",
        new_qualified: "Orders.Count",
        old_table: "Sales",
        new_table: "Orders",
        old_field: "Qty",
        new_field: "Count",
    };
    query::rewrite(&mut query, &f);

    assert!(every_source_ref_resolves(&query));
}

/// P5: after pruning, no `From` entry is left unreferenced.
#[test]
fn p5_stale_alias_pruned_when_unreferenced() {
    let mut query = json!({
        "From": [{"Name": "s", "Entity": "Sales", "Type": 0}],
        "Select": [{
            "Name": "Sales.Qty",
            "Expression": {"Measure": {"Expression": {"SourceRef": {"Source": "s"}}, "Property": "Qty"}}
        }]
    });

    let f = RewriteFields {
        old_qualified: "Sales.Qty",
        new_qualified: "Orders.Count",
        old_table: "Sales",
        new_table: "Orders",
        old_field: "Qty",
        new_field: "Count",
    };
    query::rewrite(&mut query, &f);

    let entries = from_entries(&query);
    assert!(!entries.iter().any(|(_, entity)| entity == "Sales"));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, "Orders");
}

/// Chaining two independent rewrites through the same query must keep
/// every alias unique and every reference resolvable (P4/P5 survive
/// composition, not just a single rewrite).
#[test]
fn aliases_stay_consistent_across_chained_rewrites() {
    let mut query = json!({
        "From": [
            {"Name": "s", "Entity": "Sales", "Type": 0},
            {"Name": "c", "Entity": "Customers", "Type": 0}
        ],
        "Select": [
            {
                "Name": "Sales.Qty",
                "Expression": {"Measure": {"Expression": {"SourceRef": {"Source": "s"}}, "Property": "Qty"}}
            },
            {
                "Name": "Customers.Name",
                "Expression": {"Measure": {"Expression": {"SourceRef": {"Source": "c"}}, "Property": "Name"}}
            }
        ]
    });

    let f1 = RewriteFields {
        old_qualified: "Sales.Qty",
        new_qualified: "Orders.Count",
        old_table: "Sales",
        new_table: "Orders",
        old_field: "Qty",
        new_field: "Count",
    };
    query::rewrite(&mut query, &f1);

    let f2 = RewriteFields {
        old_qualified: "Customers.Name",
        new_qualified: "Orders.Client",
        old_table: "Customers",
        new_table: "Orders",
        old_field: "Name",
        new_field: "Client",
    };
    query::rewrite(&mut query, &f2);

    assert!(every_source_ref_resolves(&query));
    let entries = from_entries(&query);
    let aliases: std::collections::HashSet<&str> =
        entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(aliases.len(), entries.len(), "aliases must stay unique");
}
