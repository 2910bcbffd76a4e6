//! Artifact layout: file names, path grouping, existence checks.

use std::path::{Path, PathBuf};

use crate::errors::{ArtifactError, Result};

/// Vector index file name inside the artifact directory.
pub const INDEX_FILE: &str = "nco_index.db";
/// Occupation metadata file name inside the artifact directory.
pub const META_FILE: &str = "nco_meta.csv";
/// Model identifier file name inside the artifact directory.
pub const MODEL_NAME_FILE: &str = "model_name.txt";

/// Paths to the three artifact files, grouped so callers pass one handle.
#[derive(Clone, Debug)]
pub struct ArtifactPaths {
    index: PathBuf,
    meta: PathBuf,
    model_name: PathBuf,
}

impl ArtifactPaths {
    /// Build the standard layout under an artifact directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            index: root.join(INDEX_FILE),
            meta: root.join(META_FILE),
            model_name: root.join(MODEL_NAME_FILE),
        }
    }

    /// Path of the vector index file.
    pub fn index(&self) -> &Path {
        &self.index
    }

    /// Path of the occupation metadata file.
    pub fn meta(&self) -> &Path {
        &self.meta
    }

    /// Path of the model identifier file.
    pub fn model_name(&self) -> &Path {
        &self.model_name
    }

    /// Check that all three artifact files exist.
    ///
    /// Fails with [`ArtifactError::Missing`] naming the first absent path.
    pub fn verify(&self) -> Result<()> {
        for path in [&self.index, &self.meta, &self.model_name] {
            if !path.exists() {
                return Err(ArtifactError::Missing(path.clone()));
            }
        }
        Ok(())
    }
}

/// Read the embedding model identifier from its artifact file.
///
/// Surrounding whitespace is ignored; an empty identifier is malformed.
pub fn read_model_name(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let name = raw.trim();
    if name.is_empty() {
        return Err(ArtifactError::Malformed(format!(
            "model identifier file is empty: {}",
            path.display()
        )));
    }
    Ok(name.to_string())
}
