// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! SCSS compilation using the grass crate

use grass::{Options, OutputStyle};
use std::path::{Path, PathBuf};

/// Compile an SCSS file to expanded CSS.
///
/// `@use` and `@import` are resolved relative to the file. Errors carry
/// grass's diagnostic, including the offending span.
pub fn compile_scss(path: &Path) -> Result<String, String> {
    let options = Options::default().style(OutputStyle::Expanded);

    grass::from_path(path, &options).map_err(|e| e.to_string())
}

/// `.css` sibling of an SCSS file, used as the file name of the compiled CSS.
pub fn css_sibling(path: &Path) -> PathBuf {
    path.with_extension("css")
}
