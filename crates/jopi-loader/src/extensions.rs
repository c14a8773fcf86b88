// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Extension classification for intercepted imports.
//!
//! Imports are split in three groups by their extension:
//!
//! - stylesheets (`.css`, `.scss`) which are compiled into JavaScript modules,
//! - generic assets (images, fonts, text) which become trivial modules,
//! - everything else, which is left to the host's resolution.
//!
//! Whether a stylesheet is a CSS Module is decided by its file name, see
//! [`StylesheetScope`].

use std::path::Path;

/// Extensions compiled by the stylesheet pipeline.
pub const STYLESHEET_EXTENSIONS: &[&str] = &[".css", ".scss"];

/// Extensions turned into empty asset modules.
pub const ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".png", ".jpeg", ".gif", ".svg", ".webp", ".avif", ".ico", ".woff", ".woff2", ".ttf",
    ".txt",
];

/// Suffixes marking a CSS Module.
pub const MODULE_SUFFIXES: &[&str] = &[".module.css", ".module.scss"];

/// How an import is handled, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionClass {
    /// Left to the host's own resolution
    NotIntercepted,
    /// Static asset (image, font, text)
    GenericAsset,
    /// CSS or SCSS stylesheet
    Stylesheet,
}

impl ExtensionClass {
    /// Whether the resolve hook short-circuits this class
    pub fn is_intercepted(self) -> bool {
        !matches!(self, ExtensionClass::NotIntercepted)
    }
}

/// Classify a lowercase extension, dot included.
pub fn classify_extension(ext: &str) -> ExtensionClass {
    if STYLESHEET_EXTENSIONS.contains(&ext) {
        ExtensionClass::Stylesheet
    } else if ASSET_EXTENSIONS.contains(&ext) {
        ExtensionClass::GenericAsset
    } else {
        ExtensionClass::NotIntercepted
    }
}

/// Classify an import specifier by its extension.
pub fn classify_specifier(specifier: &str) -> ExtensionClass {
    classify_extension(&extname(specifier))
}

/// Extension of the last segment of a specifier, dot included and lowercased.
///
/// Follows `path.extname`: a leading dot does not start an extension, so
/// `.gitignore` has none.
pub fn extname(specifier: &str) -> String {
    let name = specifier.rsplit(['/', '\\']).next().unwrap_or(specifier);

    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(pos) => name[pos..].to_ascii_lowercase(),
    }
}

/// Whether a stylesheet is a CSS Module or a plain stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetScope {
    /// Global stylesheet, imported for its side effects
    Plain,
    /// `*.module.css` / `*.module.scss`, imported for its class names
    Scoped,
}

impl StylesheetScope {
    /// Classify a stylesheet path by its file name.
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if MODULE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            StylesheetScope::Scoped
        } else {
            StylesheetScope::Plain
        }
    }
}
