use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use walkdir::WalkDir;

use rust_pbix_refactor::report::inventory;
use rust_pbix_refactor::{container, layout, replace_field, reset_slicers, RewriteOptions, SlicerResetOptions};

#[derive(Parser)]
#[command(name = "pbix-refactor")]
#[command(author, version, about = "Structural field-reference rewriter for Power BI thin reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every structural occurrence of a Table.Field reference
    Replace {
        /// A .pbix file, or a directory walked recursively for *.pbix files
        path: PathBuf,

        /// The qualifier to replace, e.g. "Sales.Qty"
        old: String,

        /// The qualifier to replace it with, e.g. "Orders.Count"
        new: String,

        /// Skip files with this name (e.g. the data-model file of a thin report)
        #[arg(short, long)]
        model_filename: Option<String>,

        /// Also rewrite page-level filters, not just bookmarks (carries the
        /// host-stability hazard noted for report-level filter rewriting)
        #[arg(long)]
        include_report_filters: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Clear the "all items selected" marker on multi-select slicers that
    /// have no explicit selection filter
    ResetSlicers {
        /// A .pbix file, or a directory walked recursively for *.pbix files
        path: PathBuf,

        /// Skip files with this name
        #[arg(short, long)]
        model_filename: Option<String>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report which of a set of candidate fields are referenced anywhere
    /// in a report's field inventory (advisory only; see design notes)
    Check {
        /// A .pbix file
        path: PathBuf,

        /// Candidate fields, qualified ("Table.Field") or bare ("Field")
        fields: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replace {
            path,
            old,
            new,
            model_filename,
            include_report_filters,
            verbose,
        } => {
            let options = RewriteOptions {
                verbose,
                include_report_filters,
            };
            run_over_targets(&path, model_filename.as_deref(), |file| {
                replace_field(file, &old, &new, &options).map(|_| ())
            })
        }

        Commands::ResetSlicers {
            path,
            model_filename,
            verbose,
        } => {
            let options = SlicerResetOptions { verbose };
            run_over_targets(&path, model_filename.as_deref(), |file| {
                reset_slicers(file, &options).map(|_| ())
            })
        }

        Commands::Check { path, fields } => {
            let bytes = container::read_layout_bytes(&path)?;
            let text = container::decode_utf16le(&bytes, &path)?;
            let tree = layout::parse_layout(&text)?;
            let field_set = inventory::field_set(&tree)?;
            for field in inventory::find_instances(&field_set, &fields) {
                println!("{field}");
            }
            Ok(())
        }
    }
}

/// Collect `*.pbix` targets under `path` (or `path` itself if it is a
/// file), excluding any file named `model_filename`, and run `f` over
/// them in parallel. Exits non-zero if any file failed.
fn run_over_targets(
    path: &Path,
    model_filename: Option<&str>,
    f: impl Fn(&Path) -> Result<()> + Sync,
) -> Result<()> {
    let targets = collect_pbix_targets(path, model_filename)?;

    let failures: Vec<(PathBuf, anyhow::Error)> = targets
        .into_par_iter()
        .filter_map(|target| match f(&target) {
            Ok(()) => None,
            Err(err) => Some((target, err)),
        })
        .collect();

    for (target, err) in &failures {
        eprintln!("failed to process {}: {err:#}", target.display());
    }

    if !failures.is_empty() {
        anyhow::bail!("{} of the processed files failed", failures.len());
    }
    Ok(())
}

fn collect_pbix_targets(path: &Path, model_filename: Option<&str>) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let targets = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("pbix"))
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str());
            match (name, model_filename) {
                (Some(name), Some(model)) => name != model,
                _ => true,
            }
        })
        .collect();
    Ok(targets)
}
