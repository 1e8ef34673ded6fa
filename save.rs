use crate::error::{Pdf2TxtError, Result};
use crate::naming::{mirrored_output_path, split_relative, top_folder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result body of the save-to-folder endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSummary {
    pub success: bool,
    pub success_count: usize,
    pub failed_count: usize,
    pub output_path: PathBuf,
}

/// Pick the folder converted uploads are written into.
///
/// A non-empty `requested` directory wins over `default_dir`. When the first
/// upload carries a relative path with a folder, that folder name is appended
/// so the uploaded tree is reproduced underneath.
pub fn resolve_output_root(
    requested: Option<&str>,
    first_rel: Option<&str>,
    default_dir: &Path,
) -> PathBuf {
    let base = match requested.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_dir.to_path_buf(),
    };

    match first_rel.and_then(top_folder) {
        Some(folder) => base.join(folder),
        None => base,
    }
}

/// Writes converted text files under a prepared output root
#[derive(Debug)]
pub struct LocalSave {
    root: PathBuf,
}

impl LocalSave {
    /// Create the output root (and parents)
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Pdf2TxtError::InvalidPath {
            path: root.clone(),
            reason: format!("cannot create output directory: {}", e),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `text` at the mirrored location of `rel` (or `fallback_name`)
    pub fn write(&self, rel: Option<&str>, fallback_name: &str, text: &str) -> Result<PathBuf> {
        let rel = rel.filter(|rel| !split_relative(rel).is_empty());
        let target = mirrored_output_path(&self.root, rel, fallback_name);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, text)?;

        debug!("Wrote {} bytes to {}", text.len(), target.display());
        Ok(target)
    }
}
