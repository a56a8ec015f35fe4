//! Common test utilities for rust-pbix-refactor tests.
//!
//! There are no real Power BI sample files available to this crate, so
//! fixtures are synthesized on disk with `zip`/`tempfile` rather than
//! copied from a `tests/fixtures` directory.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A temp-directory-backed `.pbix` fixture.
pub struct PbixFixture {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl PbixFixture {
    /// Build a `.pbix` whose `Report/Layout` member decodes to `layout`.
    /// `extra_members` are copied in verbatim (name, bytes) to exercise
    /// member-preservation invariants; pass an empty slice for a minimal
    /// fixture.
    pub fn new(layout: &Value, extra_members: &[(&str, &[u8])]) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("sample.pbix");

        let file = File::create(&path).expect("failed to create fixture file");
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("Report/Layout", options).unwrap();
        let text = serde_json::to_string(layout).unwrap();
        let utf16le: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        zip.write_all(&utf16le).unwrap();

        for (name, bytes) in extra_members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap();

        PbixFixture {
            _temp_dir: temp_dir,
            path,
        }
    }

    /// Decode the current `Report/Layout` member back into a JSON tree.
    pub fn read_layout(&self) -> Value {
        let bytes = rust_pbix_refactor::container::read_layout_bytes(&self.path).unwrap();
        let text = rust_pbix_refactor::container::decode_utf16le(&bytes, &self.path).unwrap();
        rust_pbix_refactor::layout::parse_layout(&text).unwrap()
    }

    /// The member names currently present in the container, in order.
    pub fn member_names(&self) -> Vec<String> {
        let file = File::open(&self.path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        archive.file_names().map(str::to_string).collect()
    }
}

/// A single data-visual with a `prototypeQuery` projecting `old_qualified`,
/// suitable for exercising an end-to-end field rewrite.
pub fn data_visual(old_table: &str, old_field: &str, alias: &str) -> Value {
    let old_qualified = format!("{old_table}.{old_field}");
    serde_json::json!({
        "x": 0, "y": 0, "z": 0, "width": 300, "height": 200,
        "config": serde_json::to_string(&serde_json::json!({
            "singleVisual": {
                "visualType": "barChart",
                "prototypeQuery": {
                    "From": [{"Name": alias, "Entity": old_table, "Type": 0}],
                    "Select": [{
                        "Name": old_qualified,
                        "Expression": {"Measure": {
                            "Expression": {"SourceRef": {"Source": alias}},
                            "Property": old_field
                        }}
                    }]
                }
            }
        })).unwrap(),
        "filters": "[]"
    })
}

/// A layout tree with a single page containing `visuals`.
pub fn layout_with_visuals(visuals: Vec<Value>) -> Value {
    serde_json::json!({
        "sections": [{"visualContainers": visuals}],
        "config": serde_json::to_string(&serde_json::json!({"bookmarks": []})).unwrap()
    })
}

pub fn path_for<'a>(fixture: &'a PbixFixture) -> &'a Path {
    &fixture.path
}
