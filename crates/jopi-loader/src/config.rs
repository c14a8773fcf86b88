// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration.
//!
//! Values are layered: defaults, then the global file
//! (`<config dir>/jopi/loader.toml`), then `jopi-loader.toml` in the project
//! directory, then `JOPI_LOADER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{LoaderError, Result};

/// Project-level configuration file name
pub const CONFIG_FILE_NAME: &str = "jopi-loader.toml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "JOPI_LOADER_";

/// Naming template for scoped class names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassNaming {
    /// `[name]__[local]___[hash]`, unique across files sharing local names
    #[default]
    Hashed,
    /// `[name]__[local]`, only safe when file names are unique
    Plain,
}

impl ClassNaming {
    /// Pattern handed to the CSS Modules transform
    pub fn template(self) -> &'static str {
        match self {
            ClassNaming::Hashed => "[name]__[local]___[hash]",
            ClassNaming::Plain => "[name]__[local]",
        }
    }
}

/// Spelling of the keys of the exported class map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalsConvention {
    /// Keys are the class names as authored
    #[default]
    AsIs,
    /// Keys are camel-cased (`primary-button` becomes `primaryButton`)
    CamelCaseOnly,
}

/// Default export of generic asset modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetExport {
    /// `export default {};`
    #[default]
    EmptyObject,
    /// The asset's file path as a string
    Path,
}

/// Configuration shared by the hooks, the plugin and the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderConfig {
    /// Naming template for CSS Modules
    pub class_naming: ClassNaming,

    /// Spelling of class map keys
    pub locals_convention: LocalsConvention,

    /// Default export of generic asset modules
    pub asset_export: AssetExport,

    /// `globalThis` property called with the path of plain stylesheets;
    /// empty or absent disables the lookup
    pub on_css_imported: Option<String>,

    /// `globalThis` property called with the CSS of CSS Modules, in place of
    /// `<style>` injection
    pub on_css: Option<String>,

    /// Build output directory names mirrored to `source_dir` when a
    /// stylesheet is missing
    pub output_dirs: Vec<String>,

    /// Directory holding the authored stylesheets
    pub source_dir: String,
}

/// Global called with the path and CSS of plain stylesheets
pub const DEFAULT_ON_CSS_IMPORTED: &str = "jopiOnCssImported";

/// Global called with the CSS of CSS Modules
pub const DEFAULT_ON_CSS: &str = "jopiloader-oncss";

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            class_naming: ClassNaming::default(),
            locals_convention: LocalsConvention::default(),
            asset_export: AssetExport::default(),
            on_css_imported: Some(DEFAULT_ON_CSS_IMPORTED.to_string()),
            on_css: Some(DEFAULT_ON_CSS.to_string()),
            output_dirs: vec!["dist".to_string()],
            source_dir: "src".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from default locations for a project directory.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let mut config = LoaderConfig::default();

        if let Some(global_config_path) = global_config_path() {
            if global_config_path.is_file() {
                config = config.merge_from_file(&global_config_path)?;
            }
        }

        let project_config_path = project_dir.join(CONFIG_FILE_NAME);
        if project_config_path.is_file() {
            config = config.merge_from_file(&project_config_path)?;
        }

        config.load_from_env();

        Ok(config)
    }

    /// Read a configuration file on its own, without layering.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay the keys present in a file on top of this configuration.
    fn merge_from_file(self, path: &Path) -> Result<Self> {
        debug!("Reading loader config from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)?;

        let mut merged = match toml::Value::try_from(&self) {
            Ok(toml::Value::Table(current)) => current,
            Ok(_) => toml::Table::new(),
            Err(e) => return Err(LoaderError::Config(e.to_string())),
        };
        merged.extend(table);

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Apply `JOPI_LOADER_*` environment variables.
    fn load_from_env(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                if let Err(e) = self.set(&config_key, &value) {
                    debug!("Ignoring {}: {}", key, e);
                }
            }
        }
    }

    /// Set a configuration value from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "class-naming" => self.class_naming = parse_enum(key, value)?,
            "locals-convention" => self.locals_convention = parse_enum(key, value)?,
            "asset-export" => self.asset_export = parse_enum(key, value)?,
            "on-css-imported" => self.on_css_imported = non_empty(value),
            "on-css" => self.on_css = non_empty(value),
            "output-dirs" => {
                self.output_dirs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|dir| !dir.is_empty())
                    .map(String::from)
                    .collect();
            }
            "source-dir" => self.source_dir = value.to_string(),
            _ => return Err(LoaderError::Config(format!("unknown key '{}'", key))),
        }
        Ok(())
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    T::deserialize(serde::de::value::StrDeserializer::<serde::de::value::Error>::new(value))
        .map_err(|e| LoaderError::Config(format!("{}: {}", key, e)))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Get the global configuration file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jopi").join("loader.toml"))
}
