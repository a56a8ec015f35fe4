//! End-to-end slicer-reset tests (§4.5 scenario 6).

use rust_pbix_refactor::{reset_slicers, SlicerResetOptions};

use crate::common::{layout_with_visuals, PbixFixture};

fn slicer_visual(with_general_filter: bool) -> serde_json::Value {
    let mut single_visual = serde_json::json!({
        "visualType": "slicer",
        "objects": {
            "data": [{"properties": {
                "isInvertedSelectionMode": {"expr": {"Literal": {"Value": "true"}}}
            }}]
        }
    });
    if with_general_filter {
        single_visual["objects"]["general"] =
            serde_json::json!([{"properties": {"filter": {"expr": {}}}}]);
    }
    serde_json::json!({
        "x": 0, "y": 0, "z": 0, "width": 150, "height": 300,
        "config": serde_json::to_string(&serde_json::json!({"singleVisual": single_visual})).unwrap()
    })
}

#[test]
fn scenario_6_clears_inverted_selection_marker() {
    let layout = layout_with_visuals(vec![slicer_visual(false)]);
    let fixture = PbixFixture::new(&layout, &[]);

    let updated = reset_slicers(&fixture.path, &SlicerResetOptions { verbose: false }).unwrap();
    assert_eq!(updated, 1);

    let tree = fixture.read_layout();
    let config: serde_json::Value = serde_json::from_str(
        tree["sections"][0]["visualContainers"][0]["config"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    assert!(config["singleVisual"]["objects"]["data"][0]["properties"]
        .get("isInvertedSelectionMode")
        .is_none());
}

#[test]
fn leaves_slicer_with_explicit_general_filter_untouched() {
    let layout = layout_with_visuals(vec![slicer_visual(true)]);
    let fixture = PbixFixture::new(&layout, &[]);
    let before = std::fs::read(&fixture.path).unwrap();

    let updated = reset_slicers(&fixture.path, &SlicerResetOptions { verbose: false }).unwrap();
    assert_eq!(updated, 0);

    let after = std::fs::read(&fixture.path).unwrap();
    assert_eq!(before, after);
}
