// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolve and load hooks.
//!
//! The hooks sit in front of the host's own resolution and loading, which
//! they reach through [`NextResolve`] and [`NextLoad`]:
//!
//! - `resolve` short-circuits stylesheet and asset specifiers with a
//!   synthetic format, and retries failed resolutions of directories and
//!   extension-less paths;
//! - `load` turns those synthetic formats into module source.
//!
//! [`NodeResolver`] and [`FsLoader`] are strict ESM defaults usable when no
//! other host is involved.

mod load;
mod node;
mod resolve;

pub use node::{FsLoader, NodeResolver, BUILTIN_MODULES};

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::config::LoaderConfig;
use crate::error::{LoaderError, ResolveError, Result};
use crate::stylesheet::StylesheetCompiler;

/// Format tag of generic assets
pub const ASSET_FORMAT: &str = "jopi-loader";

/// Format tag of stylesheets
pub const STYLESHEET_FORMAT: &str = "jopi-loader-css";

/// Module format attached to a resolved URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleFormat {
    /// Generic asset, loaded as a trivial module
    Asset,
    /// Stylesheet, loaded through the stylesheet compiler
    Stylesheet,
    /// ECMAScript module
    Module,
    /// CommonJS module
    CommonJs,
    /// JSON module
    Json,
    /// Built-in module of the host
    Builtin,
    /// Any other host format, kept verbatim
    Other(String),
}

impl ModuleFormat {
    /// Format name as seen by the host
    pub fn as_str(&self) -> &str {
        match self {
            ModuleFormat::Asset => ASSET_FORMAT,
            ModuleFormat::Stylesheet => STYLESHEET_FORMAT,
            ModuleFormat::Module => "module",
            ModuleFormat::CommonJs => "commonjs",
            ModuleFormat::Json => "json",
            ModuleFormat::Builtin => "builtin",
            ModuleFormat::Other(name) => name,
        }
    }

    /// Whether the format was produced by the resolve hook
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ModuleFormat::Asset | ModuleFormat::Stylesheet)
    }
}

impl From<&str> for ModuleFormat {
    fn from(name: &str) -> Self {
        match name {
            ASSET_FORMAT => ModuleFormat::Asset,
            STYLESHEET_FORMAT => ModuleFormat::Stylesheet,
            "module" => ModuleFormat::Module,
            "commonjs" => ModuleFormat::CommonJs,
            "json" => ModuleFormat::Json,
            "builtin" => ModuleFormat::Builtin,
            other => ModuleFormat::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host state accompanying a resolve call
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// URL of the importing module, absent for the entry point
    pub parent_url: Option<Url>,
    /// Import conditions, threaded through to the host
    pub conditions: Vec<String>,
}

impl ResolveContext {
    /// Context for an import made from `parent_url`
    pub fn new(parent_url: Option<Url>) -> Self {
        Self {
            parent_url,
            conditions: Vec::new(),
        }
    }

    /// Context for an import made from the file at `parent`
    pub fn from_parent_path(parent: &Path) -> Result<Self> {
        let url = Url::from_file_path(parent)
            .map_err(|_| LoaderError::InvalidUrl(parent.display().to_string()))?;
        Ok(Self::new(Some(url)))
    }
}

/// Result of resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Canonical URL of the module
    pub url: Url,
    /// Format of the module, when known
    pub format: Option<ModuleFormat>,
    /// Whether the rest of the resolution chain must be skipped
    pub short_circuit: bool,
}

/// Host state accompanying a load call
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    /// Format returned by resolution
    pub format: Option<ModuleFormat>,
    /// Import conditions, threaded through to the host
    pub conditions: Vec<String>,
}

impl LoadContext {
    /// Context for loading a resolved module
    pub fn for_resolved(resolved: &ResolvedModule) -> Self {
        Self {
            format: resolved.format.clone(),
            conditions: Vec::new(),
        }
    }
}

/// Result of loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Module source, absent for built-ins
    pub source: Option<String>,
    /// Format of the source
    pub format: ModuleFormat,
    /// Whether the rest of the load chain must be skipped
    pub short_circuit: bool,
}

impl LoadedModule {
    /// A synthesized ES module that ends the load chain
    pub fn synthetic(source: String) -> Self {
        Self {
            source: Some(source),
            format: ModuleFormat::Module,
            short_circuit: true,
        }
    }
}

/// The host's default resolution, called when a specifier is not intercepted
#[async_trait]
pub trait NextResolve: Send + Sync {
    /// Resolve `specifier` in `context`
    async fn resolve(
        &self,
        specifier: &str,
        context: &ResolveContext,
    ) -> std::result::Result<ResolvedModule, ResolveError>;
}

/// The host's default loading, called for formats the hooks do not own
#[async_trait]
pub trait NextLoad: Send + Sync {
    /// Load the module at `url`
    async fn load(&self, url: &Url, context: &LoadContext) -> Result<LoadedModule>;
}

/// Resolve and load hooks sharing one stylesheet compiler
#[derive(Debug, Clone)]
pub struct LoaderHooks {
    config: Arc<LoaderConfig>,
    compiler: StylesheetCompiler,
}

impl LoaderHooks {
    /// Create hooks for a configuration
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    /// Create hooks sharing an existing configuration
    pub fn with_config(config: Arc<LoaderConfig>) -> Self {
        let compiler = StylesheetCompiler::new(Arc::clone(&config));
        Self { config, compiler }
    }

    /// The configuration in use
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The stylesheet compiler behind `load`
    pub fn compiler(&self) -> &StylesheetCompiler {
        &self.compiler
    }
}

impl Default for LoaderHooks {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}
