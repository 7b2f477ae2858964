//! Zip helpers for single-file archives.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::TransformError;

/// Pack `content` into an in-memory zip archive holding one Deflate entry.
pub fn zip_bytes(entry_name: &str, content: &[u8]) -> Result<Vec<u8>, TransformError> {
    let archive_error = |e: &dyn std::fmt::Display| TransformError::Archive {
        path: entry_name.into(),
        reason: e.to_string(),
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(entry_name, options)
        .map_err(|e| archive_error(&e))?;
    zip.write_all(content).map_err(|e| archive_error(&e))?;

    let cursor = zip.finish().map_err(|e| archive_error(&e))?;
    Ok(cursor.into_inner())
}

/// Extract every entry of `reader` under `dest`, returning the number of files written.
///
/// Entries whose names would resolve outside `dest` are rejected.
pub fn unzip_into<R: Read + Seek>(reader: R, dest: &Path) -> Result<usize, TransformError> {
    let archive_error = |e: &dyn std::fmt::Display| TransformError::Archive {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    };

    let mut archive = ZipArchive::new(reader).map_err(|e| archive_error(&e))?;
    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| archive_error(&e))?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| TransformError::UnsafeEntry {
                entry: entry.name().to_string(),
            })?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| TransformError::Write {
                path: out_path.clone(),
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TransformError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| TransformError::Write {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| TransformError::Write {
            path: out_path.clone(),
            source,
        })?;
        written += 1;
    }

    Ok(written)
}
