//! End-to-end field-rewrite tests driven through the public API against
//! synthetic `.pbix` fixtures (§8 testable properties).

use pretty_assertions::assert_eq;
use rust_pbix_refactor::{replace_field, RewriteOptions};

use crate::common::{data_visual, layout_with_visuals, PbixFixture};

fn options() -> RewriteOptions {
    RewriteOptions {
        verbose: false,
        include_report_filters: false,
    }
}

#[test]
fn scenario_1_alias_generated_and_field_relocated() {
    let layout = layout_with_visuals(vec![data_visual("Sales", "Qty", "s")]);
    let fixture = PbixFixture::new(&layout, &[]);

    let updated = replace_field(&fixture.path, "Sales.Qty", "Orders.Count", &options()).unwrap();
    assert_eq!(updated, 1);

    let tree = fixture.read_layout();
    let config: serde_json::Value = serde_json::from_str(
        tree["sections"][0]["visualContainers"][0]["config"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let query = &config["singleVisual"]["prototypeQuery"];
    assert_eq!(query["From"][0]["Entity"], "Orders");
    assert_eq!(query["Select"][0]["Name"], "Orders.Count");
    assert_eq!(query["Select"][0]["Expression"]["Measure"]["Property"], "Count");
}

/// P1: a rewrite whose `old` matches nothing leaves the container
/// un-re-emitted (mtime/content-level no-op surfaced as a zero count).
#[test]
fn p1_no_match_does_not_rewrite() {
    let layout = layout_with_visuals(vec![data_visual("Sales", "Qty", "s")]);
    let fixture = PbixFixture::new(&layout, &[]);
    let before = std::fs::read(&fixture.path).unwrap();

    let updated =
        replace_field(&fixture.path, "NoSuchTable.NoSuchField", "Orders.Count", &options()).unwrap();
    assert_eq!(updated, 0);

    let after = std::fs::read(&fixture.path).unwrap();
    assert_eq!(before, after);
}

/// P2: applying (old, new) then (new, old) restores every field key.
#[test]
fn p2_round_trip_restores_qualified_names() {
    let layout = layout_with_visuals(vec![data_visual("Sales", "Qty", "s")]);
    let fixture = PbixFixture::new(&layout, &[]);

    replace_field(&fixture.path, "Sales.Qty", "Orders.Count", &options()).unwrap();
    replace_field(&fixture.path, "Orders.Count", "Sales.Qty", &options()).unwrap();

    let tree = fixture.read_layout();
    let config: serde_json::Value = serde_json::from_str(
        tree["sections"][0]["visualContainers"][0]["config"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let query = &config["singleVisual"]["prototypeQuery"];
    assert_eq!(query["From"][0]["Entity"], "Sales");
    assert_eq!(query["Select"][0]["Name"], "Sales.Qty");
    assert_eq!(query["Select"][0]["Expression"]["Measure"]["Property"], "Qty");
}

/// P6: non-data visual kinds are never touched.
#[test]
fn p6_non_data_visual_untouched() {
    let textbox = serde_json::json!({
        "x": 0, "y": 0, "z": 0, "width": 100, "height": 50,
        "config": serde_json::to_string(&serde_json::json!({
            "singleVisual": {"visualType": "textbox"}
        })).unwrap()
    });
    let layout = layout_with_visuals(vec![textbox.clone()]);
    let fixture = PbixFixture::new(&layout, &[]);

    let updated = replace_field(&fixture.path, "Sales.Qty", "Orders.Count", &options()).unwrap();
    assert_eq!(updated, 0);

    let tree = fixture.read_layout();
    assert_eq!(tree["sections"][0]["visualContainers"][0], textbox);
}

/// P7: SecurityBindings is dropped on any write that mutates the report.
#[test]
fn p7_security_bindings_dropped_on_write() {
    let layout = layout_with_visuals(vec![data_visual("Sales", "Qty", "s")]);
    let fixture = PbixFixture::new(&layout, &[("SecurityBindings", b"signature-bytes")]);
    assert!(fixture.member_names().contains(&"SecurityBindings".to_string()));

    replace_field(&fixture.path, "Sales.Qty", "Orders.Count", &options()).unwrap();

    assert!(!fixture.member_names().contains(&"SecurityBindings".to_string()));
}

/// Member order and unrelated byte content are preserved for a mutating
/// write (§3 invariant 5, restricted to non-Layout members).
#[test]
fn preserves_unrelated_members_on_write() {
    let layout = layout_with_visuals(vec![data_visual("Sales", "Qty", "s")]);
    let fixture = PbixFixture::new(&layout, &[("DiagramLayout", b"diagram-bytes")]);

    replace_field(&fixture.path, "Sales.Qty", "Orders.Count", &options()).unwrap();

    let names = fixture.member_names();
    assert!(names.contains(&"DiagramLayout".to_string()));
    assert!(names.contains(&"Report/Layout".to_string()));
}
