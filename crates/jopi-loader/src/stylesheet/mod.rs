// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Stylesheet compiler.
//!
//! Turns a `.css` or `.scss` file into the source of a JavaScript module:
//!
//! ```text
//! .scss → grass → CSS ─┐
//! .css ───────────────┴→ lightningcss → module source
//!                        (CSS Modules for *.module.*)
//! ```
//!
//! Nothing is cached: every call reads and compiles the file again.

pub mod css_modules;
pub mod scss;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::emit;
use crate::error::{LoaderError, Result};
use crate::extensions::{StylesheetScope, extname};
use crate::locator::{SourceLocator, is_file};

/// JavaScript source produced for an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// Module text, ready to be evaluated by the host
    pub source: String,
}

/// A compiled stylesheet, before it is turned into module source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    /// File that was actually compiled
    pub path: PathBuf,
    /// CSS Module or plain stylesheet
    pub scope: StylesheetScope,
    /// Final CSS text
    pub css: String,
    /// Local class name to scoped class name; empty for plain stylesheets
    pub class_names: BTreeMap<String, String>,
}

impl CompiledStylesheet {
    /// Emit the module source for this stylesheet.
    pub fn to_module(&self, config: &LoaderConfig) -> ModuleSource {
        let source = match self.scope {
            StylesheetScope::Scoped => {
                emit::scoped_module(&self.css, &self.class_names, callback(&config.on_css))
            }
            StylesheetScope::Plain => emit::plain_module(
                &self.path.to_string_lossy(),
                &self.css,
                callback(&config.on_css_imported),
            ),
        };

        ModuleSource { source }
    }
}

/// Host-agnostic stylesheet compiler shared by the hooks and the plugin
#[derive(Debug, Clone)]
pub struct StylesheetCompiler {
    config: Arc<LoaderConfig>,
    locator: SourceLocator,
}

impl StylesheetCompiler {
    /// Create a compiler for a configuration
    pub fn new(config: Arc<LoaderConfig>) -> Self {
        let locator = SourceLocator::from_config(&config);
        Self { config, locator }
    }

    /// The configuration in use
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Compile a stylesheet into module source.
    pub async fn compile(&self, file_path: &Path) -> Result<ModuleSource> {
        let compiled = self.compile_stylesheet(file_path).await?;
        Ok(compiled.to_module(&self.config))
    }

    /// Compile a stylesheet, keeping the CSS and class map separate.
    ///
    /// Whether the result is a CSS Module is decided by `file_path` as
    /// imported, even when the source found on disk lives elsewhere.
    pub async fn compile_stylesheet(&self, file_path: &Path) -> Result<CompiledStylesheet> {
        let path = if is_file(file_path).await {
            file_path.to_path_buf()
        } else {
            self.locator.locate(file_path).await?
        };

        let scope = StylesheetScope::of(file_path);
        debug!("Compiling {} ({:?})", path.display(), scope);

        let css = match extname(&path.to_string_lossy()).as_str() {
            ".scss" => None,
            _ => Some(tokio::fs::read_to_string(&path).await?),
        };

        let naming = self.config.class_naming;
        let convention = self.config.locals_convention;
        let task_path = path.clone();

        let transformed = run_blocking(move || {
            let (css, filename) = match css {
                Some(css) => (css, task_path),
                None => (
                    scss::compile_scss(&task_path)?,
                    scss::css_sibling(&task_path),
                ),
            };
            css_modules::transform(&css, &filename, scope, naming, convention)
        })
        .await
        .map_err(|message| {
            warn!("jopi-loader - cannot compile {}: {}", path.display(), message);
            LoaderError::compile(&path, message)
        })?;

        Ok(CompiledStylesheet {
            path,
            scope,
            css: transformed.css,
            class_names: transformed.class_names,
        })
    }
}

/// Run compiler work on the blocking pool; a panicking task is reported
/// like any other compile failure.
async fn run_blocking<T, F>(work: F) -> std::result::Result<T, String>
where
    F: FnOnce() -> std::result::Result<T, String> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(e.to_string()))
}

/// Configured global name, if any
fn callback(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|name| !name.is_empty())
}

impl Default for StylesheetCompiler {
    fn default() -> Self {
        Self::new(Arc::new(LoaderConfig::default()))
    }
}
