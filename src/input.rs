//! DDL file discovery and decoding

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use encoding_rs::WINDOWS_1252;

use crate::error::DdlImportError;

/// Read a DDL script as text.
///
/// UTF-8 is tried first (a leading BOM is stripped); scripts exported by older
/// Windows tooling fall back to Windows-1252.
pub fn read_sql_file(path: &Path) -> Result<String, DdlImportError> {
    let bytes = std::fs::read(path).map_err(|e| DdlImportError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(match s.strip_prefix('\u{FEFF}') {
            Some(stripped) => stripped.to_string(),
            None => s,
        }),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(DdlImportError::FileDecodeError {
                    path: path.to_path_buf(),
                });
            }
            Ok(decoded.into_owned())
        }
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

/// Expand CLI inputs into a sorted, deduplicated list of `.sql` files.
///
/// Each input may be a file, a directory (searched recursively), or a glob
/// pattern.
pub fn collect_sql_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_sql_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else if input.contains(['*', '?', '[']) {
            let matched: Vec<PathBuf> = glob::glob(input)?
                .filter_map(|p| p.ok())
                .filter(|p| p.is_file())
                .collect();
            if matched.is_empty() {
                log::warn!("pattern {} matched no files", input);
            }
            files.extend(matched);
        } else {
            bail!("input not found: {}", input);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
