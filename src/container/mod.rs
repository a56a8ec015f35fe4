//! Read/write the `Report/Layout` member of a `.pbix` zip container.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::PbixError;

/// The container member holding the report layout.
pub const LAYOUT_MEMBER: &str = "Report/Layout";

/// The container member dropped on write — its presence would sign a
/// payload that no longer matches the rewritten layout.
pub const SECURITY_BINDINGS_MEMBER: &str = "SecurityBindings";

/// Read the raw (UTF-16) bytes of `Report/Layout` out of `path`.
pub fn read_layout_bytes(path: &Path) -> Result<Vec<u8>, PbixError> {
    let file = File::open(path).map_err(|_| PbixError::PathNotFound {
        path: path.to_path_buf(),
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| PbixError::ContainerOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut entry =
        archive
            .by_name(LAYOUT_MEMBER)
            .map_err(|_| PbixError::LayoutMemberMissing {
                path: path.to_path_buf(),
            })?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| PbixError::LayoutMemberRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes)
}

/// Decode UTF-16LE bytes (no BOM assumed) into a `String`.
pub fn decode_utf16le(bytes: &[u8], path: &Path) -> Result<String, PbixError> {
    let (text, _, had_errors) = encoding_rs::UTF_16LE.decode(bytes);
    if had_errors {
        return Err(PbixError::Utf16Decode {
            path: path.to_path_buf(),
        });
    }
    Ok(text.into_owned())
}

/// Encode `text` as BOM-less UTF-16LE bytes.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Derive the sibling temp path `{base} Temp{ext}` used for the atomic swap.
fn temp_path_for(original: &Path) -> PathBuf {
    let dir = original.parent().unwrap_or_else(|| Path::new("."));
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = original
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    dir.join(format!("{stem} Temp{ext}"))
}

/// Atomically rewrite `path`'s container, replacing `Report/Layout` with
/// `new_layout_text` and dropping `SecurityBindings`. Every other member is
/// copied verbatim (raw, uncompressed-then-recompressed bytes preserved)
/// in its original order.
///
/// On any failure, the original container is left untouched and any
/// partial temp file is removed.
pub fn write_container(path: &Path, new_layout_text: &str) -> Result<(), PbixError> {
    let temp_path = temp_path_for(path);

    let result = (|| -> Result<(), PbixError> {
        let original_file = File::open(path).map_err(|_| PbixError::PathNotFound {
            path: path.to_path_buf(),
        })?;
        let mut archive =
            ZipArchive::new(original_file).map_err(|source| PbixError::ContainerOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let temp_file = File::create(&temp_path).map_err(|source| PbixError::ContainerWrite {
            path: temp_path.clone(),
            source,
        })?;
        let mut writer = ZipWriter::new(temp_file);

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|source| PbixError::ContainerOpen {
                path: path.to_path_buf(),
                source,
            })?;
            let name = entry.name().to_string();

            if name == SECURITY_BINDINGS_MEMBER {
                continue;
            }

            if name == LAYOUT_MEMBER {
                drop(entry);
                let options = SimpleFileOptions::default()
                    .compression_method(CompressionMethod::Deflated);
                writer
                    .start_file(LAYOUT_MEMBER, options)
                    .map_err(|source| PbixError::ContainerWrite {
                        path: temp_path.clone(),
                        source: std::io::Error::new(std::io::ErrorKind::Other, source),
                    })?;
                writer
                    .write_all(&encode_utf16le(new_layout_text))
                    .map_err(|source| PbixError::ContainerWrite {
                        path: temp_path.clone(),
                        source,
                    })?;
            } else {
                writer.raw_copy_file(entry).map_err(|source| PbixError::ContainerWrite {
                    path: temp_path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, source),
                })?;
            }
        }

        writer.finish().map_err(|source| PbixError::ContainerWrite {
            path: temp_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        })?;
        Ok(())
    })();

    if let Err(err) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(source) = std::fs::remove_file(path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(PbixError::ContainerRename {
            path: path.to_path_buf(),
            source,
        });
    }
    if let Err(source) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(PbixError::ContainerRename {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
