// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input discovery and editor selection arguments.

use crate::error::{CliError, CliResult};
use std::path::{Path, PathBuf};

/// JSON export files under `path`, sorted by path.
///
/// A file path is returned as-is whatever its extension. Directories are
/// walked recursively for `*.json` files.
pub fn collect_inputs(path: &Path) -> CliResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(CliError::InputNotFound(path.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e: Result<walkdir::DirEntry, walkdir::Error>| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e: &walkdir::DirEntry| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
        .collect();
    files.sort();

    tracing::debug!("Found {} export file(s) under {}", files.len(), path.display());
    Ok(files)
}

/// `--select Class=/Game/Path.Name` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Asset class of the selection
    pub class: String,
    /// Content path of the selected asset
    pub path: String,
}

/// Parse a `Class=Path` selection
pub fn parse_selection(arg: &str) -> Result<Selection, String> {
    let (class, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected <Class>=<Path>, got '{arg}'"))?;
    let (class, path) = (class.trim(), path.trim());
    if class.is_empty() || path.is_empty() {
        return Err(format!("expected <Class>=<Path>, got '{arg}'"));
    }
    Ok(Selection {
        class: class.to_string(),
        path: path.to_string(),
    })
}
