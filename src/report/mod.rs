//! Report orchestrator (§4.6): walks pages/visuals/bookmarks/report
//! filters, drives the visual orchestrator, and re-emits the container.

pub mod inventory;

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::container;
use crate::error::PbixError;
use crate::layout;
use crate::layout::walk;
use crate::query::RewriteFields;
use crate::util::Qualifier;

/// Options threaded through a field-replace run (SPEC_FULL.md §B, §D.2).
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Print an "Updated: {title}" line per mutated visual and a summary
    /// count, matching the original's texture.
    pub verbose: bool,
    /// Gate on rewriting page-level `filters` (§9 hazard note). Bookmarks
    /// are always walked regardless of this flag.
    pub include_report_filters: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            verbose: false,
            include_report_filters: false,
        }
    }
}

/// Options threaded through a slicer-reset run.
#[derive(Debug, Clone, Default)]
pub struct SlicerResetOptions {
    pub verbose: bool,
}

/// Replace every structural occurrence of `old` with `new` inside the
/// `.pbix` container at `path`. Returns the number of visuals updated; `0`
/// means the container was left untouched on disk (§7: "no fields to
/// update" must not re-emit).
pub fn replace_field(path: &Path, old: &str, new: &str, options: &RewriteOptions) -> Result<usize> {
    let old_qualifier = crate::util::parse_qualifier(old)?;
    let new_qualifier = crate::util::parse_qualifier(new)?;
    let old_qualified = old_qualifier.qualified();
    let new_qualified = new_qualifier.qualified();
    let f = RewriteFields {
        old_qualified: &old_qualified,
        new_qualified: &new_qualified,
        old_table: &old_qualifier.table,
        new_table: &new_qualifier.table,
        old_field: &old_qualifier.field,
        new_field: &new_qualifier.field,
    };

    let bytes = container::read_layout_bytes(path)?;
    let text = container::decode_utf16le(&bytes, path)?;
    let mut tree = layout::parse_layout(&text).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;

    let mut updated = 0usize;

    if let Some(sections) = tree.get_mut("sections").and_then(Value::as_array_mut) {
        for section in sections.iter_mut() {
            let Some(containers) = section
                .get_mut("visualContainers")
                .and_then(Value::as_array_mut)
            else {
                continue;
            };
            for record in containers.iter_mut() {
                updated += rewrite_visual(record, &f, options.verbose, path)?;
            }

            if options.include_report_filters {
                rewrite_page_filters(section, &f, path)?;
            }
        }
    }

    rewrite_bookmarks(&mut tree, &old_qualifier, &new_qualifier, path)?;

    if updated == 0 {
        if options.verbose {
            println!("No fields to update");
        }
        return Ok(0);
    }

    let new_text = layout::serialize_layout(&tree).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;
    container::write_container(path, &new_text)?;

    if options.verbose {
        println!("Updated {updated} visual(s) in {}", path.display());
    }

    Ok(updated)
}

fn rewrite_visual(
    record: &mut Value,
    f: &RewriteFields,
    verbose: bool,
    path: &Path,
) -> Result<usize, PbixError> {
    let mut visual = crate::visual::Visual::parse(record).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;
    let title = visual.title().map(str::to_string);
    let changed = visual
        .rewrite_field(f)
        .map_err(|source| PbixError::LayoutJson {
            path: path.to_path_buf(),
            source,
        })?;

    if changed && verbose {
        println!("Updated: {}", title.unwrap_or_default());
    }
    Ok(if changed { 1 } else { 0 })
}

/// Reset the "inverted selection" marker (§4.5) on every slicer visual
/// across every page. Returns the number of visuals reset.
pub fn reset_slicers(path: &Path, options: &SlicerResetOptions) -> Result<usize> {
    let bytes = container::read_layout_bytes(path)?;
    let text = container::decode_utf16le(&bytes, path)?;
    let mut tree = layout::parse_layout(&text).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;

    let mut updated = 0usize;
    if let Some(sections) = tree.get_mut("sections").and_then(Value::as_array_mut) {
        for section in sections.iter_mut() {
            let Some(containers) = section
                .get_mut("visualContainers")
                .and_then(Value::as_array_mut)
            else {
                continue;
            };
            for record in containers.iter_mut() {
                let mut visual =
                    crate::visual::Visual::parse(record).map_err(|source| PbixError::LayoutJson {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let changed = visual.reset_slicer().map_err(|source| PbixError::LayoutJson {
                    path: path.to_path_buf(),
                    source,
                })?;
                if changed {
                    updated += 1;
                }
            }
        }
    }

    if updated == 0 {
        if options.verbose {
            println!("No slicers to reset");
        }
        return Ok(0);
    }

    let new_text = layout::serialize_layout(&tree).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;
    container::write_container(path, &new_text)?;

    if options.verbose {
        println!("Reset {updated} slicer(s) in {}", path.display());
    }

    Ok(updated)
}

/// Walk the top-level `config` (carrying `bookmarks`) and rewrite every
/// bookmark node matching `{Property: old_field, Expression.SourceRef.Entity:
/// old_table}`. Bookmarks are always walked; unlike page filters, there is
/// no opt-in gate (§4.6, §9).
fn rewrite_bookmarks(
    tree: &mut Value,
    old: &Qualifier,
    new: &Qualifier,
    path: &Path,
) -> Result<(), PbixError> {
    let Some(mut config) = layout::decode_nested(tree, "config").map_err(|source| {
        PbixError::LayoutJson {
            path: path.to_path_buf(),
            source,
        }
    })?
    else {
        return Ok(());
    };

    let Some(bookmarks) = config.get_mut("bookmarks").and_then(Value::as_array_mut) else {
        return Ok(());
    };

    let mut mutated = false;
    for bookmark in bookmarks.iter_mut() {
        walk::walk_objects_mut(bookmark, &mut |map| {
            let is_target = matches!(map.get("Property"), Some(Value::String(s)) if s == &old.field)
                && map
                    .get("Expression")
                    .and_then(|e| e.get("SourceRef"))
                    .and_then(|s| s.get("Entity"))
                    .and_then(Value::as_str)
                    == Some(old.table.as_str());
            if !is_target {
                return;
            }
            map.insert("Property".to_string(), Value::String(new.field.clone()));
            if let Some(entity) = map
                .get_mut("Expression")
                .and_then(|e| e.get_mut("SourceRef"))
                .and_then(Value::as_object_mut)
            {
                entity.insert("Entity".to_string(), Value::String(new.table.clone()));
            }
            mutated = true;
        });
    }

    if mutated {
        let encoded = layout::encode_nested(&config).map_err(|source| PbixError::LayoutJson {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(obj) = tree.as_object_mut() {
            obj.insert("config".to_string(), Value::String(encoded));
        }
    }

    Ok(())
}

/// Walk a page's `filters` sub-document and apply the same `Property`/
/// `Entity` rewrite as bookmarks. Only invoked when
/// [`RewriteOptions::include_report_filters`] is set.
fn rewrite_page_filters(
    section: &mut Value,
    f: &RewriteFields,
    path: &Path,
) -> Result<(), PbixError> {
    let Some(mut filters) = layout::decode_nested(section, "filters").map_err(|source| {
        PbixError::LayoutJson {
            path: path.to_path_buf(),
            source,
        }
    })?
    else {
        return Ok(());
    };

    crate::visual::filters::rewrite(&mut filters, f);

    let encoded = layout::encode_nested(&filters).map_err(|source| PbixError::LayoutJson {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(obj) = section.as_object_mut() {
        obj.insert("filters".to_string(), Value::String(encoded));
    }
    Ok(())
}
