//! rust-pbix-refactor: a structural field-reference rewriter for Power BI
//! thin-report containers.
//!
//! A user supplies an old and new `Table.Field` qualifier; this crate
//! locates every structural occurrence of the old reference inside a
//! `.pbix` container's layout and rewrites it to the new reference,
//! preserving every other byte of the container.

pub mod container;
pub mod error;
pub mod layout;
pub mod query;
pub mod report;
pub mod util;
pub mod visual;

pub use error::PbixError;
pub use report::{replace_field, reset_slicers, RewriteOptions, SlicerResetOptions};
