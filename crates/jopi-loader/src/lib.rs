// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # jopi-loader
//!
//! Module hooks that make non-JavaScript imports work inside a running
//! JavaScript host.
//!
//! - `.css` / `.scss` imports are compiled into modules. CSS Modules
//!   (`*.module.css`, `*.module.scss`) export their scoped class names and
//!   inject their CSS; plain stylesheets export their file path.
//! - Images, fonts and text files become trivial modules.
//! - Directory imports and extension-less imports that strict ESM resolution
//!   rejects are retried with `index.js`, `<dir>.cjs.js`, `<dir>.js` and `.js`.
//!
//! The same [`StylesheetCompiler`] backs both host integrations: the
//! resolve/load hooks ([`LoaderHooks`]) and the content-interception plugin
//! ([`StylesheetPlugin`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jopi_loader::{FsLoader, LoadContext, LoaderHooks, NodeResolver, ResolveContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let hooks = LoaderHooks::default();
//!     let context = ResolveContext::from_parent_path(Path::new("/app/src/main.js"))?;
//!
//!     let resolved = hooks.resolve("./button.module.scss", &context, &NodeResolver).await?;
//!     let loaded = hooks
//!         .load(&resolved.url, &LoadContext::for_resolved(&resolved), &FsLoader)
//!         .await?;
//!     println!("{}", loaded.source.unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod declarations;
pub mod emit;
pub mod error;
pub mod extensions;
pub mod hooks;
pub mod locator;
pub mod plugin;
pub mod registration;
pub mod stylesheet;

// Re-exports
pub use config::{AssetExport, ClassNaming, LoaderConfig, LocalsConvention};
pub use declarations::TYPE_DECLARATIONS;
pub use error::{LoaderError, ResolveError, Result};
pub use extensions::{ExtensionClass, StylesheetScope, classify_extension, classify_specifier};
pub use hooks::{
    FsLoader, LoadContext, LoadedModule, LoaderHooks, ModuleFormat, NextLoad, NextResolve,
    NodeResolver, ResolveContext, ResolvedModule,
};
pub use locator::SourceLocator;
pub use plugin::{ContentLoader, OnLoadArgs, OnLoadResult, StylesheetPlugin};
pub use registration::{Host, HookHost, PluginHost, Registration, install};
pub use stylesheet::{CompiledStylesheet, ModuleSource, StylesheetCompiler};

/// Version of the loader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
