//! Source file discovery.

use crate::error::EtlError;
use glob::glob;
use std::path::{Path, PathBuf};

/// Recursively collect every file under `root` whose name matches `pattern`
/// (e.g. "*.json"), as a sorted, deduplicated list of absolute paths.
///
/// An existing but empty tree yields an empty list; a missing root is an
/// error.
pub fn discover(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, EtlError> {
    if !root.is_dir() {
        return Err(EtlError::RootNotFound(root.to_path_buf()));
    }

    let full_pattern = root.join("**").join(pattern);
    let full_pattern = full_pattern.to_string_lossy().into_owned();
    let entries = glob(&full_pattern).map_err(|e| EtlError::Pattern {
        pattern: full_pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EtlError::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path.canonicalize()?);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
