// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Maps stylesheet paths that only exist in compiled output back to their
//! authored sources.
//!
//! Compiled JavaScript in `dist/` still imports `./button.module.css`, but the
//! stylesheet only exists as `src/button.module.scss`.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};

/// Finds the authored source of a missing stylesheet
#[derive(Debug, Clone)]
pub struct SourceLocator {
    /// Output directory names, e.g. `dist`
    output_dirs: Vec<String>,
    /// Source directory name, e.g. `src`
    source_dir: String,
}

impl SourceLocator {
    /// Create a locator mirroring `output_dirs` onto `source_dir`
    pub fn new(output_dirs: Vec<String>, source_dir: impl Into<String>) -> Self {
        Self {
            output_dirs,
            source_dir: source_dir.into(),
        }
    }

    /// Create a locator from the loader configuration
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.output_dirs.clone(), config.source_dir.clone())
    }

    /// Find an existing source file for `missing`.
    pub async fn locate(&self, missing: &Path) -> Result<PathBuf> {
        for candidate in self.candidates(missing) {
            if is_file(&candidate).await {
                debug!(
                    "Using {} as source of {}",
                    candidate.display(),
                    missing.display()
                );
                return Ok(candidate);
            }
        }

        Err(LoaderError::SourceNotFound(missing.to_path_buf()))
    }

    /// Candidate paths in probing order: same directory first, then the
    /// mirrored source directory, each with the original extension followed
    /// by its stylesheet counterpart.
    pub fn candidates(&self, missing: &Path) -> Vec<PathBuf> {
        let Some(stem) = missing.file_stem() else {
            return Vec::new();
        };
        let stem = stem.to_string_lossy();
        let ext = missing
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let mut extensions = vec![ext.clone()];
        match ext.as_str() {
            "css" => extensions.push("scss".to_string()),
            "scss" => extensions.push("css".to_string()),
            _ => {}
        }

        let mut dirs = Vec::new();
        if let Some(parent) = missing.parent() {
            dirs.push(parent.to_path_buf());
            if let Some(mirrored) = self.mirror_to_source(parent) {
                dirs.push(mirrored);
            }
        }

        let mut candidates = Vec::with_capacity(dirs.len() * extensions.len());
        for dir in &dirs {
            for ext in &extensions {
                if ext.is_empty() {
                    candidates.push(dir.join(stem.as_ref()));
                } else {
                    candidates.push(dir.join(format!("{}.{}", stem, ext)));
                }
            }
        }
        candidates
    }

    /// Replace the last output directory component of `dir` with the source
    /// directory.
    fn mirror_to_source(&self, dir: &Path) -> Option<PathBuf> {
        let components: Vec<Component<'_>> = dir.components().collect();
        let index = components.iter().rposition(|c| match c {
            Component::Normal(name) => self
                .output_dirs
                .iter()
                .any(|out| name.to_str() == Some(out.as_str())),
            _ => false,
        })?;

        let mut mirrored = PathBuf::new();
        for (i, component) in components.iter().enumerate() {
            if i == index {
                mirrored.push(&self.source_dir);
            } else {
                mirrored.push(component.as_os_str());
            }
        }
        Some(mirrored)
    }
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

/// Whether `path` exists and is a regular file.
pub(crate) async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
