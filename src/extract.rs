//! Newline-delimited JSON extraction.

use crate::error::EtlError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read `path` as newline-delimited JSON, one record of type `T` per
/// non-empty line. An empty file yields an empty vec; any line that is not
/// a valid record of `T` fails the whole file with its 1-based line number.
pub fn extract<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EtlError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T =
            serde_json::from_str(&line).map_err(|e| EtlError::MalformedRecord {
                file: path.to_path_buf(),
                line: i + 1,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(records)
}
