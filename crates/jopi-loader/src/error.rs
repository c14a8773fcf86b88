// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the loader hooks

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while resolving or loading a module
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No authored source exists for a missing stylesheet path
    #[error("Cannot find source of '{}'", .0.display())]
    SourceNotFound(PathBuf),

    /// SCSS compilation or the CSS Modules transform failed
    #[error("Cannot compile '{}': {message}", .path.display())]
    StylesheetCompile {
        /// Stylesheet being compiled
        path: PathBuf,
        /// Diagnostic reported by the compiler
        message: String,
    },

    /// Error reported by the host resolver
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A specifier or URL that cannot be turned into a module location
    #[error("Invalid module URL '{0}'")]
    InvalidUrl(String),

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LoaderError {
    /// Create a stylesheet compilation error
    pub fn compile(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StylesheetCompile {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failures of the host's default resolution.
///
/// The two file-related variants carry the URL the host computed, which is
/// what the resolve hook's fallback probes from.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The specifier points at a directory (`ERR_UNSUPPORTED_DIR_IMPORT`)
    #[error("Directory import '{url}' is not supported resolving ES modules")]
    UnsupportedDirImport {
        /// Specifier as written
        specifier: String,
        /// URL of the directory
        url: Url,
    },

    /// Nothing exists at the resolved location (`ERR_MODULE_NOT_FOUND`)
    #[error("Cannot find module '{}'", not_found_target(.specifier, .url))]
    ModuleNotFound {
        /// Specifier as written
        specifier: String,
        /// Resolved URL, absent for bare package specifiers
        url: Option<Url>,
    },

    /// Any other resolution failure
    #[error("{0}")]
    Other(String),
}

fn not_found_target<'a>(specifier: &'a str, url: &'a Option<Url>) -> &'a str {
    url.as_ref().map_or(specifier, Url::as_str)
}

impl ResolveError {
    /// Create a module not found error
    pub fn module_not_found(specifier: impl Into<String>, url: Option<Url>) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.into(),
            url,
        }
    }
}
