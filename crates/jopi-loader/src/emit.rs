// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! JavaScript sources of the synthetic modules.
//!
//! Every value is embedded as a JSON literal, which is also a valid
//! JavaScript literal.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::AssetExport;

/// Source of a generic asset module.
pub fn asset_module(export: AssetExport, path: &str) -> String {
    match export {
        AssetExport::EmptyObject => "export default {};".to_string(),
        AssetExport::Path => format!(
            "const __PATH__ = {}; export default __PATH__;",
            string_literal(path)
        ),
    }
}

/// Source of a CSS Module: the class map is the default export, the CSS is
/// handed to `on_css` when that global exists, otherwise injected as a
/// `<style>` element when a document exists.
pub fn scoped_module(
    css: &str,
    class_names: &BTreeMap<String, String>,
    on_css: Option<&str>,
) -> String {
    let mut source = format!(
        "const __CSS__ = {};\nconst __TOKENS__ = {};\n",
        string_literal(css),
        map_literal(class_names)
    );

    let inject = "if (typeof document !== \"undefined\") {
  const style = document.createElement(\"style\");
  style.setAttribute(\"type\", \"text/css\");
  style.appendChild(document.createTextNode(__CSS__));
  document.head.appendChild(style);
}\n";

    match on_css {
        Some(name) => {
            source.push_str(&global_lookup("__ON_CSS__", name));
            source.push_str(
                "\nif (typeof __ON_CSS__ === \"function\") {\n  __ON_CSS__(__CSS__);\n} else ",
            );
            source.push_str(inject);
        }
        None => {
            source.push('\n');
            source.push_str(inject);
        }
    }

    source.push_str("\nexport default __TOKENS__;\n");
    source
}

/// Source of a plain stylesheet: the file path is the default export and is
/// handed, with the CSS, to `on_css_imported` when that global exists.
pub fn plain_module(path: &str, css: &str, on_css_imported: Option<&str>) -> String {
    let mut source = format!(
        "const __PATH__ = {};\nconst __CSS__ = {};\n",
        string_literal(path),
        string_literal(css)
    );

    if let Some(name) = on_css_imported {
        source.push_str(&global_lookup("__ON_CSS_IMPORTED__", name));
        source.push_str(
            "\nif (typeof __ON_CSS_IMPORTED__ === \"function\") \
             __ON_CSS_IMPORTED__(__PATH__, __CSS__);\n",
        );
    }

    source.push_str("\nexport default __PATH__;\n");
    source
}

fn global_lookup(binding: &str, name: &str) -> String {
    format!(
        "const {} = typeof globalThis !== \"undefined\" ? globalThis[{}] : undefined;\n",
        binding,
        string_literal(name)
    )
}

fn string_literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn map_literal(map: &BTreeMap<String, String>) -> String {
    let object: serde_json::Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(object).to_string()
}
