// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Load hook

use tracing::debug;
use url::Url;

use super::{LoadContext, LoadedModule, LoaderHooks, ModuleFormat, NextLoad};
use crate::emit;
use crate::error::{LoaderError, Result};

impl LoaderHooks {
    /// Load a resolved URL.
    ///
    /// Assets become a trivial module, stylesheets are compiled, everything
    /// else is loaded by `next`.
    pub async fn load(
        &self,
        url: &Url,
        context: &LoadContext,
        next: &dyn NextLoad,
    ) -> Result<LoadedModule> {
        match &context.format {
            Some(ModuleFormat::Asset) => {
                let path = url
                    .to_file_path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| url.to_string());

                Ok(LoadedModule::synthetic(emit::asset_module(
                    self.config().asset_export,
                    &path,
                )))
            }
            Some(ModuleFormat::Stylesheet) => {
                let path = url
                    .to_file_path()
                    .map_err(|_| LoaderError::InvalidUrl(url.to_string()))?;
                debug!("Loading stylesheet {}", path.display());

                let module = self.compiler().compile(&path).await?;
                Ok(LoadedModule::synthetic(module.source))
            }
            _ => next.load(url, context).await,
        }
    }
}
