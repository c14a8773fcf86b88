// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolve hook

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::{LoaderHooks, ModuleFormat, NextResolve, ResolveContext, ResolvedModule};
use crate::error::{LoaderError, ResolveError, Result};
use crate::extensions::{ExtensionClass, classify_specifier};
use crate::locator::is_file;

impl LoaderHooks {
    /// Resolve an import specifier.
    ///
    /// Stylesheets and assets are answered directly, without touching the
    /// file system. Anything else goes to `next`; when that fails because
    /// the target is a directory or lacks its `.js` extension, likely
    /// candidates are probed and handed back to `next`.
    pub async fn resolve(
        &self,
        specifier: &str,
        context: &ResolveContext,
        next: &dyn NextResolve,
    ) -> Result<ResolvedModule> {
        let format = match classify_specifier(specifier) {
            ExtensionClass::Stylesheet => Some(ModuleFormat::Stylesheet),
            ExtensionClass::GenericAsset => Some(ModuleFormat::Asset),
            ExtensionClass::NotIntercepted => None,
        };

        if let Some(format) = format {
            let url = join_specifier(specifier, context)?;
            debug!("jopi-loader found: {} format is {}", specifier, format);

            return Ok(ResolvedModule {
                url,
                format: Some(format),
                short_circuit: true,
            });
        }

        match next.resolve(specifier, context).await {
            Ok(resolved) => Ok(resolved),
            Err(ResolveError::UnsupportedDirImport { url, .. }) => {
                resolve_directory(specifier, &url, context, next).await
            }
            Err(ResolveError::ModuleNotFound { url: Some(url), .. }) => {
                resolve_js_extension(specifier, &url, context, next).await
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// URL of an intercepted specifier, relative to the importing module.
fn join_specifier(specifier: &str, context: &ResolveContext) -> Result<Url> {
    let invalid = || LoaderError::InvalidUrl(specifier.to_string());

    if let Some(parent) = &context.parent_url {
        return parent.join(specifier).map_err(|_| invalid());
    }

    let path = Path::new(specifier);
    if path.is_absolute() {
        return Url::from_file_path(path).map_err(|_| invalid());
    }

    Url::parse(specifier).map_err(|_| invalid())
}

/// Retry a directory import with `index.js`, `<dir>.cjs.js` then `<dir>.js`.
async fn resolve_directory(
    specifier: &str,
    url: &Url,
    context: &ResolveContext,
    next: &dyn NextResolve,
) -> Result<ResolvedModule> {
    if let Ok(base_path) = url.to_file_path() {
        let basename = base_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let candidates = [
            "index.js".to_string(),
            format!("{}.cjs.js", basename),
            format!("{}.js", basename),
        ];

        for file in &candidates {
            if is_file(&base_path.join(file)).await {
                let adjusted = format!("{}/{}", specifier.trim_end_matches('/'), file);
                debug!("Resolving directory import {} as {}", specifier, adjusted);
                return Ok(next.resolve(&adjusted, context).await?);
            }
        }
    }

    // Reports the host's own error
    Ok(next.resolve(specifier, context).await?)
}

/// Retry a missing module with `.js` appended.
async fn resolve_js_extension(
    specifier: &str,
    url: &Url,
    context: &ResolveContext,
    next: &dyn NextResolve,
) -> Result<ResolvedModule> {
    if let Ok(base_path) = url.to_file_path() {
        let mut candidate = OsString::from(base_path);
        candidate.push(".js");

        if is_file(&PathBuf::from(candidate)).await {
            let adjusted = format!("{}.js", specifier);
            debug!("Resolving {} as {}", specifier, adjusted);
            return Ok(next.resolve(&adjusted, context).await?);
        }
    }

    // Reports the host's own error
    Ok(next.resolve(specifier, context).await?)
}
