// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content-interception plugin for hosts that expose an `onLoad`-style
//! build hook instead of resolve/load hooks.
//!
//! The host matches import paths against [`StylesheetPlugin::filter`] and
//! calls [`StylesheetPlugin::on_load`] for each match.

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::stylesheet::StylesheetCompiler;

/// Name the plugin registers under
pub const PLUGIN_NAME: &str = "jopi-loader";

/// Paths intercepted by the plugin
pub const STYLESHEET_FILTER: &str = r"\.(css|scss)$";

static FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STYLESHEET_FILTER).expect("stylesheet filter is a valid regex"));

/// How the host must interpret returned contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLoader {
    /// JavaScript module
    Js,
}

impl ContentLoader {
    /// Loader name as seen by the host
    pub fn as_str(self) -> &'static str {
        match self {
            ContentLoader::Js => "js",
        }
    }
}

impl fmt::Display for ContentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of an `onLoad` call
#[derive(Debug, Clone)]
pub struct OnLoadArgs {
    /// Absolute path of the imported file
    pub path: PathBuf,
}

/// Result of an `onLoad` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnLoadResult {
    /// Replacement module contents
    pub contents: String,
    /// How the host must interpret `contents`
    pub loader: ContentLoader,
}

/// Stylesheet plugin, sharing its compiler with the resolve/load hooks
#[derive(Debug, Clone)]
pub struct StylesheetPlugin {
    compiler: StylesheetCompiler,
}

impl StylesheetPlugin {
    /// Create the plugin for a configuration
    pub fn new(config: Arc<LoaderConfig>) -> Self {
        Self {
            compiler: StylesheetCompiler::new(config),
        }
    }

    /// Plugin name
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Filter over import paths
    pub fn filter(&self) -> &Regex {
        &FILTER
    }

    /// Whether the plugin handles `path`
    pub fn matches(&self, path: &str) -> bool {
        FILTER.is_match(path)
    }

    /// Compile the intercepted stylesheet
    pub async fn on_load(&self, args: OnLoadArgs) -> Result<OnLoadResult> {
        debug!("{} intercepted {}", PLUGIN_NAME, args.path.display());
        let module = self.compiler.compile(&args.path).await?;

        Ok(OnLoadResult {
            contents: module.source,
            loader: ContentLoader::Js,
        })
    }
}

impl Default for StylesheetPlugin {
    fn default() -> Self {
        Self::new(Arc::new(LoaderConfig::default()))
    }
}
