//! Combines per-book commentary scripts into one
//!
//! The combined script is a single header line followed by the raw bytes
//! of every `*.sql` file in the commentaries directory, in file-name order.
//! Contents are never rewritten, so re-running on unchanged inputs yields a
//! byte-identical script.

use crate::emit::{header_line, COMMENTARIES_HEADER};
use crate::{HarvestError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What a compose pass wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    /// Input files, in the order they were concatenated
    pub inputs: Vec<PathBuf>,
    /// Total bytes written, header included
    pub bytes: usize,
}

/// Lists the per-book scripts in `dir`, sorted by file name
///
/// `exclude` is skipped if it lives in the same directory, so the combined
/// script can never swallow itself.
pub fn list_artifacts(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| HarvestError::artifact(dir, e))? {
        let entry = entry.map_err(|e| HarvestError::artifact(dir, e))?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }
        if excluded.is_some() && fs::canonicalize(&path).ok() == excluded {
            continue;
        }
        paths.push(path);
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Concatenates every per-book script in `dir` into `output`
///
/// # Arguments
///
/// * `dir` - Directory of per-book scripts
/// * `output` - Combined script to (over)write
///
/// # Returns
///
/// * `Ok(ComposeReport)` - Files combined and bytes written
/// * `Err(HarvestError)` - A file could not be read or written
pub fn compose(dir: &Path, output: &Path) -> Result<ComposeReport> {
    let inputs = list_artifacts(dir, Some(output))?;

    let mut combined = header_line(COMMENTARIES_HEADER).into_bytes();
    for path in &inputs {
        let data = fs::read(path).map_err(|e| HarvestError::artifact(path, e))?;
        tracing::debug!("Adding {} ({} bytes)", path.display(), data.len());
        combined.extend_from_slice(&data);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HarvestError::artifact(parent, e))?;
    }
    fs::write(output, &combined).map_err(|e| HarvestError::artifact(output, e))?;

    tracing::info!(
        "Composed {} files into {} ({} bytes)",
        inputs.len(),
        output.display(),
        combined.len()
    );

    Ok(ComposeReport {
        inputs,
        bytes: combined.len(),
    })
}
