//! Visual classification and orchestration (§3 Visual, §4.4 Visual
//! Orchestrator).

pub mod command_query;
pub mod config;
pub mod data_transforms;
pub mod filters;
pub mod objects;
pub mod slicer;

use serde_json::Value;

use crate::layout::{self, walk};
use crate::query::RewriteFields;

/// Visual kinds that are never structurally rewritten.
const NON_DATA_VISUAL_TYPES: [&str; 4] = ["image", "textbox", "shape", "actionButton"];

/// The keys a qualified `Table.Field` identifier can appear under as a
/// synthetic, sibling-referenced key.
const IDENTIFIER_KEYS: [&str; 3] = ["queryRef", "Name", "queryName"];

/// A single visual container's parsed sub-documents plus its raw record.
pub struct Visual<'a> {
    record: &'a mut Value,
    config: Option<Value>,
    filters: Option<Value>,
    query: Option<Value>,
    data_transforms: Option<Value>,
}

impl<'a> Visual<'a> {
    /// Parse `config` unconditionally, and, for data visuals, the
    /// remaining optional sub-documents.
    pub fn parse(record: &'a mut Value) -> Result<Self, serde_json::Error> {
        let config = layout::decode_nested(record, "config")?;
        let is_data_visual = config
            .as_ref()
            .map(is_data_visual_config)
            .unwrap_or(false);

        let (filters, query, data_transforms) = if is_data_visual {
            (
                layout::decode_nested(record, "filters")?,
                layout::decode_nested(record, "query")?,
                layout::decode_nested(record, "dataTransforms")?,
            )
        } else {
            (None, None, None)
        };

        Ok(Visual {
            record,
            config,
            filters,
            query,
            data_transforms,
        })
    }

    /// `config.singleVisual.visualType`, if present.
    pub fn visual_type(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .get("singleVisual")?
            .get("visualType")?
            .as_str()
    }

    /// True unless this visual's type is one of the non-data kinds (or
    /// absent).
    pub fn is_data_visual(&self) -> bool {
        self.config
            .as_ref()
            .map(is_data_visual_config)
            .unwrap_or(false)
    }

    /// `config.singleVisual.vcObjects.title[0].properties.text.expr.Literal.Value`.
    pub fn title(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .get("singleVisual")?
            .get("vcObjects")?
            .get("title")?
            .get(0)?
            .get("properties")?
            .get("text")?
            .get("expr")?
            .get("Literal")?
            .get("Value")?
            .as_str()
    }

    /// Does any parsed sub-document mention `old_qualified` at one of the
    /// synthetic identifier keys?
    fn references(&self, old_qualified: &str) -> bool {
        [&self.config, &self.filters, &self.query, &self.data_transforms]
            .into_iter()
            .flatten()
            .any(|doc| walk::any_value_at_keys_equals(doc, &IDENTIFIER_KEYS, old_qualified))
    }

    /// Run the §4.4 predicate-then-rewrite sequence. Returns `true` if the
    /// visual was mutated (and its sub-documents re-encoded back into the
    /// record).
    pub fn rewrite_field(&mut self, f: &RewriteFields) -> Result<bool, serde_json::Error> {
        if !self.is_data_visual() || !self.references(f.old_qualified) {
            return Ok(false);
        }

        let mut touched = [false; 4]; // config, data_transforms, query, filters

        if let Some(config) = self.config.as_mut() {
            config::rewrite(config, f);
            touched[0] = true;
        }
        if let Some(data_transforms) = self.data_transforms.as_mut() {
            data_transforms::rewrite(data_transforms, f);
            touched[1] = true;
        }
        if let Some(query) = self.query.as_mut() {
            command_query::rewrite(query, f);
            touched[2] = true;
        }
        if let Some(filters) = self.filters.as_mut() {
            filters::rewrite(filters, f);
            touched[3] = true;
        }

        self.reencode(touched)?;
        Ok(true)
    }

    /// Run the §4.5 slicer reset. Returns `true` if `config` was mutated
    /// (and re-encoded back into the record).
    pub fn reset_slicer(&mut self) -> Result<bool, serde_json::Error> {
        if self.visual_type() != Some("slicer") {
            return Ok(false);
        }
        let Some(config) = self.config.as_mut() else {
            return Ok(false);
        };
        if !slicer::reset(config) {
            return Ok(false);
        }
        self.reencode([true, false, false, false])?;
        Ok(true)
    }

    fn reencode(&mut self, touched: [bool; 4]) -> Result<(), serde_json::Error> {
        let docs = [&self.config, &self.data_transforms, &self.query, &self.filters];
        let Some(record) = self.record.as_object_mut() else {
            return Ok(());
        };
        for (i, field) in NESTED_FIELDS_ORCHESTRATION.iter().enumerate() {
            if !touched[i] {
                continue;
            }
            if let Some(doc) = docs[i] {
                record.insert(field.to_string(), Value::String(layout::encode_nested(doc)?));
            }
        }
        Ok(())
    }
}

/// Sub-document field names in the orchestration order used by
/// [`Visual::reencode`]: config, dataTransforms, query, filters.
const NESTED_FIELDS_ORCHESTRATION: [&str; 4] = ["config", "dataTransforms", "query", "filters"];

fn is_data_visual_config(config: &Value) -> bool {
    let visual_type = config
        .get("singleVisual")
        .and_then(|sv| sv.get("visualType"))
        .and_then(Value::as_str);
    match visual_type {
        Some(t) => !NON_DATA_VISUAL_TYPES.contains(&t),
        None => false,
    }
}
