// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CSS Modules transform backed by lightningcss.

use lightningcss::css_modules::{self, CssModuleExports, CssModuleReference, Pattern};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{ClassNaming, LocalsConvention};
use crate::extensions::StylesheetScope;

/// Output of the CSS transform
#[derive(Debug, Clone, Default)]
pub struct TransformedCss {
    /// Final CSS text
    pub css: String,
    /// Local class name to scoped class name; empty for plain stylesheets
    pub class_names: BTreeMap<String, String>,
}

/// Parse and print `css`, scoping its names when `scope` is
/// [`StylesheetScope::Scoped`].
///
/// `filename` feeds the `[name]` and `[hash]` segments of the naming template.
pub fn transform(
    css: &str,
    filename: &Path,
    scope: StylesheetScope,
    naming: ClassNaming,
    convention: LocalsConvention,
) -> Result<TransformedCss, String> {
    let css_modules = match scope {
        StylesheetScope::Scoped => Some(css_modules::Config {
            pattern: Pattern::parse(naming.template()).map_err(|e| e.to_string())?,
            ..Default::default()
        }),
        StylesheetScope::Plain => None,
    };

    let options = ParserOptions {
        filename: filename.to_string_lossy().into_owned(),
        css_modules,
        ..ParserOptions::default()
    };

    let stylesheet = StyleSheet::parse(css, options).map_err(|e| e.to_string())?;
    let result = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| e.to_string())?;

    let class_names = result
        .exports
        .map(|exports| class_map(exports, convention))
        .unwrap_or_default();

    Ok(TransformedCss {
        css: result.code,
        class_names,
    })
}

/// Flatten lightningcss exports into the shape postcss-modules produces:
/// the scoped name followed by any composed class names.
fn class_map(exports: CssModuleExports, convention: LocalsConvention) -> BTreeMap<String, String> {
    let mut entries: Vec<_> = exports.into_iter().collect();
    // Sorted so that keys colliding after renaming always resolve the same way
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut map = BTreeMap::new();
    for (local, export) in entries {
        let mut scoped = export.name;
        for reference in export.composes {
            let name = match reference {
                CssModuleReference::Local { name }
                | CssModuleReference::Global { name }
                | CssModuleReference::Dependency { name, .. } => name,
            };
            scoped.push(' ');
            scoped.push_str(&name);
        }

        let key = match convention {
            LocalsConvention::AsIs => local,
            LocalsConvention::CamelCaseOnly => camel_case(&local),
        };
        map.insert(key, scoped);
    }
    map
}

/// `primary-button` and `primary_button` become `primaryButton`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for (i, word) in name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }

    out
}
