//! NDJSON output files for dump and report runs.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::CliError;

/// Write one JSON object per line to
/// `<dir>/<prefix>_<base-joined-by-dash>_<YYYYmmdd-HHMMSS>.json`,
/// creating the directory if needed. Returns the file path.
pub fn write_ndjson<T: Serialize>(
    prefix: &str,
    base: &[String],
    dir: &Path,
    rows: &[T],
) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", dir.display())))?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{prefix}_{}_{stamp}.json", base.join("-")));

    let mut contents = String::new();
    for row in rows {
        let line = serde_json::to_string(row)
            .map_err(|e| CliError::io(format!("serialization error: {e}")))?;
        contents.push_str(&line);
        contents.push('\n');
    }
    std::fs::write(&path, contents)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}
