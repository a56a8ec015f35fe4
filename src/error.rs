//! Error types for rust-pbix-refactor

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rewriting a thin-report container.
///
/// Variants map onto the error kinds in the specification: caller input
/// errors are reported before any mutation, container format errors are
/// per-file (the batch driver skips and continues), and write failures
/// abort leaving the original container untouched.
#[derive(Error, Debug)]
pub enum PbixError {
    #[error("qualifier '{qualifier}' must contain exactly one '.' separating Table from Field")]
    QualifierSyntax { qualifier: String },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("failed to open container: {path}")]
    ContainerOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("container is missing the Report/Layout member: {path}")]
    LayoutMemberMissing { path: PathBuf },

    #[error("failed to read the Report/Layout member: {path}")]
    LayoutMemberRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode Report/Layout as UTF-16: {path}")]
    Utf16Decode { path: PathBuf },

    #[error("failed to parse Report/Layout as JSON: {path}")]
    LayoutJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build the full-JSON inventory view")]
    FullJsonView {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create temp container: {path}")]
    ContainerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to swap temp container into place: {path}")]
    ContainerRename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
