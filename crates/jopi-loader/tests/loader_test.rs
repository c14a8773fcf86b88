// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader integration tests
//!
//! Drives the hooks the way a host does: resolve with the default resolver
//! behind them, then load what was resolved.

use jopi_loader::{
    FsLoader, LoadContext, LoadedModule, LoaderConfig, LoaderError, LoaderHooks, ModuleFormat,
    NodeResolver, ResolveContext, ResolveError, ResolvedModule, StylesheetPlugin,
    plugin::OnLoadArgs,
};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

/// A project with a `src/` tree and a `dist/` build output
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("src/widgets")).unwrap();
    fs::create_dir_all(root.join("src/legacy")).unwrap();
    fs::create_dir_all(root.join("src/empty")).unwrap();
    fs::create_dir_all(root.join("dist")).unwrap();

    fs::write(root.join("src/main.js"), "import './widgets';\n").unwrap();
    fs::write(root.join("src/widgets/index.js"), "export const widgets = [];\n").unwrap();
    fs::write(root.join("src/legacy/legacy.cjs.js"), "module.exports = {};\n").unwrap();
    fs::write(root.join("src/helpers.js"), "export const help = 1;\n").unwrap();
    fs::write(
        root.join("src/button.module.scss"),
        "$accent: #0af;\n.button { color: $accent; .icon { width: 1em; } }\n",
    )
    .unwrap();
    fs::write(root.join("src/reset.css"), "* { margin: 0; }\n").unwrap();
    fs::write(root.join("src/broken.module.scss"), ".button { color: red;\n").unwrap();
    fs::write(root.join("dist/main.js"), "import './button.module.css';\n").unwrap();

    dir
}

async fn resolve_from(
    hooks: &LoaderHooks,
    parent: &Path,
    specifier: &str,
) -> jopi_loader::Result<ResolvedModule> {
    let context = ResolveContext::from_parent_path(parent)?;
    hooks.resolve(specifier, &context, &NodeResolver::new()).await
}

async fn import(
    hooks: &LoaderHooks,
    parent: &Path,
    specifier: &str,
) -> jopi_loader::Result<LoadedModule> {
    let resolved = resolve_from(hooks, parent, specifier).await?;
    hooks
        .load(&resolved.url, &LoadContext::for_resolved(&resolved), &FsLoader)
        .await
}

#[tokio::test]
async fn test_import_scss_module() {
    let dir = project();
    let main = dir.path().join("src/main.js");
    let hooks = LoaderHooks::default();

    let resolved = resolve_from(&hooks, &main, "./button.module.scss").await.unwrap();
    assert_eq!(resolved.format, Some(ModuleFormat::Stylesheet));
    assert!(resolved.short_circuit);

    let loaded = import(&hooks, &main, "./button.module.scss").await.unwrap();
    let source = loaded.source.unwrap();

    assert_eq!(loaded.format, ModuleFormat::Module);
    assert!(loaded.short_circuit);
    assert!(source.contains("\"button\":"));
    assert!(source.contains("\"icon\":"));
    assert!(source.contains("export default __TOKENS__;"));
    assert!(!source.contains("$accent"));
}

#[tokio::test]
async fn test_import_from_build_output() {
    let dir = project();
    let main = dir.path().join("dist/main.js");
    let hooks = LoaderHooks::default();

    // dist/button.module.css does not exist; src/button.module.scss does
    let loaded = import(&hooks, &main, "./button.module.css").await.unwrap();
    let source = loaded.source.unwrap();

    assert!(source.contains("\"button\":"));
    assert!(source.contains("export default __TOKENS__;"));
}

#[tokio::test]
async fn test_import_plain_stylesheet() {
    let dir = project();
    let main = dir.path().join("src/main.js");
    let hooks = LoaderHooks::default();

    let loaded = import(&hooks, &main, "./reset.css").await.unwrap();
    let source = loaded.source.unwrap();

    let expected = dir.path().join("src/reset.css");
    assert!(source.contains(&format!("const __PATH__ = {:?};", expected.to_string_lossy())));
    assert!(source.contains("export default __PATH__;"));
    assert!(!source.contains("__TOKENS__"));
}

#[tokio::test]
async fn test_compile_is_deterministic() {
    let dir = project();
    let path = dir.path().join("src/button.module.scss");
    let hooks = LoaderHooks::default();

    let first = hooks.compiler().compile(&path).await.unwrap();
    let second = hooks.compiler().compile(&path).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_import_malformed_scss() {
    let dir = project();
    let main = dir.path().join("src/main.js");

    let result = import(&LoaderHooks::default(), &main, "./broken.module.scss").await;
    assert!(matches!(result, Err(LoaderError::StylesheetCompile { .. })));
}

#[tokio::test]
async fn test_import_missing_stylesheet() {
    let dir = project();
    let main = dir.path().join("src/main.js");

    // Resolution succeeds without looking at the disk; loading reports it
    let result = import(&LoaderHooks::default(), &main, "./gone.module.css").await;
    assert!(matches!(result, Err(LoaderError::SourceNotFound(_))));
}

#[tokio::test]
async fn test_import_asset_without_file() {
    let dir = project();
    let main = dir.path().join("src/main.js");

    let loaded = import(&LoaderHooks::default(), &main, "./images/logo.png")
        .await
        .unwrap();
    assert_eq!(loaded.source.as_deref(), Some("export default {};"));
}

#[tokio::test]
async fn test_import_directory() {
    let dir = project();
    let main = dir.path().join("src/main.js");
    let hooks = LoaderHooks::default();

    let resolved = resolve_from(&hooks, &main, "./widgets").await.unwrap();
    assert!(resolved.url.path().ends_with("/src/widgets/index.js"));

    let resolved = resolve_from(&hooks, &main, "./legacy").await.unwrap();
    assert!(resolved.url.path().ends_with("/src/legacy/legacy.cjs.js"));

    let loaded = import(&hooks, &main, "./widgets").await.unwrap();
    assert_eq!(loaded.source.as_deref(), Some("export const widgets = [];\n"));
}

#[tokio::test]
async fn test_import_without_extension() {
    let dir = project();
    let main = dir.path().join("src/main.js");

    let resolved = resolve_from(&LoaderHooks::default(), &main, "./helpers")
        .await
        .unwrap();
    assert!(resolved.url.path().ends_with("/src/helpers.js"));
    assert!(!resolved.short_circuit);
}

#[tokio::test]
async fn test_unrecoverable_imports_keep_host_error() {
    let dir = project();
    let main = dir.path().join("src/main.js");
    let hooks = LoaderHooks::default();

    let result = resolve_from(&hooks, &main, "./empty").await;
    assert!(matches!(
        result,
        Err(LoaderError::Resolve(ResolveError::UnsupportedDirImport { .. }))
    ));

    let result = resolve_from(&hooks, &main, "./nowhere").await;
    assert!(matches!(
        result,
        Err(LoaderError::Resolve(ResolveError::ModuleNotFound { .. }))
    ));

    let result = resolve_from(&hooks, &main, "left-pad").await;
    assert!(matches!(
        result,
        Err(LoaderError::Resolve(ResolveError::ModuleNotFound { url: None, .. }))
    ));
}

#[tokio::test]
async fn test_builtin_passes_through() {
    let dir = project();
    let main = dir.path().join("src/main.js");

    let loaded = import(&LoaderHooks::default(), &main, "node:fs").await.unwrap();
    assert_eq!(loaded.format, ModuleFormat::Builtin);
    assert!(loaded.source.is_none());
}

#[tokio::test]
async fn test_plugin_matches_hooks() {
    let dir = project();
    let path = dir.path().join("src/button.module.scss");

    let hooks = LoaderHooks::default();
    let from_hooks = hooks.compiler().compile(&path).await.unwrap();

    let plugin = StylesheetPlugin::new(std::sync::Arc::new(LoaderConfig::default()));
    let from_plugin = plugin.on_load(OnLoadArgs { path }).await.unwrap();

    assert_eq!(from_plugin.contents, from_hooks.source);
}
