// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Default host resolution and loading, following strict ESM rules.
//!
//! No extensions are appended and directories are never resolved to an
//! index file: those cases fail with the errors the resolve hook's fallback
//! recovers from.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use super::{
    LoadContext, LoadedModule, ModuleFormat, NextLoad, NextResolve, ResolveContext,
    ResolvedModule,
};
use crate::error::{LoaderError, ResolveError, Result};

/// Core modules, importable with or without the `node:` scheme
pub const BUILTIN_MODULES: &[&str] = &[
    // Networking
    "dgram", "dns", "dns/promises", "http", "http2", "https", "net", "tls",
    // Files and processes
    "child_process", "cluster", "fs", "fs/promises", "os", "path", "path/posix",
    "path/win32", "process", "worker_threads",
    // Data
    "buffer", "crypto", "querystring", "string_decoder", "url", "zlib",
    // Streams and I/O
    "readline", "readline/promises", "stream", "stream/promises", "stream/web", "tty",
    // Runtime
    "assert", "assert/strict", "async_hooks", "console", "constants", "diagnostics_channel",
    "domain", "events", "inspector", "module", "perf_hooks", "punycode", "repl", "sys",
    "timers", "timers/promises", "util", "util/types", "v8", "vm", "wasi",
];

/// Core modules only reachable through the `node:` scheme
pub const SCHEME_ONLY_MODULES: &[&str] = &["sea", "sqlite", "test", "test/reporters"];

/// Canonical `node:` URL of a built-in specifier.
///
/// `Ok(None)` when the specifier is not a built-in; an unknown module behind
/// the `node:` scheme is an error rather than a package lookup.
fn builtin_url(specifier: &str) -> std::result::Result<Option<Url>, ResolveError> {
    let (name, scheme) = match specifier.strip_prefix("node:") {
        Some(name) => (name, true),
        None => (specifier, false),
    };

    let known = BUILTIN_MODULES.contains(&name) || (scheme && SCHEME_ONLY_MODULES.contains(&name));
    match (known, scheme) {
        (true, _) => Url::parse(&format!("node:{}", name))
            .map(Some)
            .map_err(|e| ResolveError::Other(e.to_string())),
        (false, true) => Err(ResolveError::Other(format!(
            "No such built-in module: {}",
            specifier
        ))),
        (false, false) => Ok(None),
    }
}

/// Bare specifier split into the package name and the path inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PackageSpecifier<'a> {
    name: &'a str,
    subpath: Option<&'a str>,
}

impl<'a> PackageSpecifier<'a> {
    /// `None` when the specifier cannot name a package, e.g. a bare `@scope`.
    fn parse(specifier: &'a str) -> Option<Self> {
        let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
        let name_end = specifier
            .match_indices('/')
            .nth(name_segments - 1)
            .map_or(specifier.len(), |(i, _)| i);
        let (name, rest) = specifier.split_at(name_end);

        let segments: Vec<&str> = name.split('/').collect();
        if segments.len() != name_segments || segments.iter().any(|s| s.is_empty() || *s == "@") {
            return None;
        }

        Some(Self {
            name,
            subpath: rest.strip_prefix('/').filter(|sub| !sub.is_empty()),
        })
    }
}

/// Minimal package.json structure for resolution
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    main: Option<String>,
    #[serde(default)]
    exports: Option<serde_json::Value>,
    #[serde(rename = "type")]
    type_field: Option<String>,
}

impl PackageJson {
    async fn read(path: &Path) -> Option<Self> {
        let content = tokio::fs::read_to_string(path).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Entry point from `exports` (string or `"."` string), then `main`
    fn entry(&self) -> Option<&str> {
        let from_exports = match &self.exports {
            Some(serde_json::Value::String(entry)) => Some(entry.as_str()),
            Some(serde_json::Value::Object(map)) => map.get(".").and_then(|v| v.as_str()),
            _ => None,
        };
        from_exports.or(self.main.as_deref())
    }
}

/// Strict ESM resolver
#[derive(Debug, Clone, Default)]
pub struct NodeResolver;

impl NodeResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Whether `specifier` names a core module, `node:` scheme or not
    pub fn is_builtin(&self, specifier: &str) -> bool {
        matches!(builtin_url(specifier), Ok(Some(_)))
    }

    /// Resolve a `file:` URL, without probing alternatives
    async fn resolve_url(
        &self,
        specifier: &str,
        url: Url,
    ) -> std::result::Result<ResolvedModule, ResolveError> {
        let path = url.to_file_path().map_err(|_| {
            ResolveError::Other(format!("Only file: URLs are supported, got '{}'", url))
        })?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Err(ResolveError::UnsupportedDirImport {
                specifier: specifier.to_string(),
                url,
            }),
            Ok(_) => Ok(ResolvedModule {
                format: Some(detect_format(&path).await),
                url,
                short_circuit: false,
            }),
            Err(_) => Err(ResolveError::module_not_found(specifier, Some(url))),
        }
    }

    /// Resolve a module from node_modules
    async fn resolve_package(
        &self,
        specifier: &str,
        parent_url: Option<&Url>,
    ) -> std::result::Result<ResolvedModule, ResolveError> {
        let package = PackageSpecifier::parse(specifier)
            .ok_or_else(|| ResolveError::module_not_found(specifier, None))?;

        let start = parent_url
            .and_then(|url| url.to_file_path().ok())
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok());

        // Walk up directory tree looking for node_modules
        let mut current = start.as_deref();
        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(package.name);

            if is_dir(&package_dir).await {
                let target = match package.subpath {
                    Some(sub) => package_dir.join(sub),
                    None => package_entry(&package_dir).await,
                };
                let url = Url::from_file_path(&target).map_err(|_| {
                    ResolveError::Other(format!("Invalid path '{}'", target.display()))
                })?;
                return self.resolve_url(specifier, url).await;
            }

            current = dir.parent();
        }

        Err(ResolveError::module_not_found(specifier, None))
    }
}

#[async_trait]
impl NextResolve for NodeResolver {
    async fn resolve(
        &self,
        specifier: &str,
        context: &ResolveContext,
    ) -> std::result::Result<ResolvedModule, ResolveError> {
        if let Some(url) = builtin_url(specifier)? {
            return Ok(ResolvedModule {
                url,
                format: Some(ModuleFormat::Builtin),
                short_circuit: true,
            });
        }

        let relative = ["./", "../", "/"].iter().any(|p| specifier.starts_with(p));
        if relative {
            let url = match &context.parent_url {
                Some(parent) => parent.join(specifier),
                None => Url::from_file_path(specifier)
                    .map_err(|_| url::ParseError::RelativeUrlWithoutBase),
            }
            .map_err(|e| {
                ResolveError::Other(format!("Invalid specifier '{}': {}", specifier, e))
            })?;
            return self.resolve_url(specifier, url).await;
        }

        if let Ok(url) = Url::parse(specifier) {
            if url.scheme() == "file" {
                return self.resolve_url(specifier, url).await;
            }
        }

        self.resolve_package(specifier, context.parent_url.as_ref()).await
    }
}

/// Loader reading module sources from disk
#[derive(Debug, Clone, Default)]
pub struct FsLoader;

#[async_trait]
impl NextLoad for FsLoader {
    async fn load(&self, url: &Url, context: &LoadContext) -> Result<LoadedModule> {
        if url.scheme() == "node" || context.format == Some(ModuleFormat::Builtin) {
            return Ok(LoadedModule {
                source: None,
                format: ModuleFormat::Builtin,
                short_circuit: true,
            });
        }

        let path = url
            .to_file_path()
            .map_err(|_| LoaderError::InvalidUrl(url.to_string()))?;
        let source = tokio::fs::read_to_string(&path).await?;

        let format = match &context.format {
            Some(format) => format.clone(),
            None => detect_format(&path).await,
        };

        Ok(LoadedModule {
            source: Some(source),
            format,
            short_circuit: true,
        })
    }
}

/// Entry file of a package directory
async fn package_entry(package_dir: &Path) -> PathBuf {
    let entry = PackageJson::read(&package_dir.join("package.json"))
        .await
        .and_then(|pkg| pkg.entry().map(String::from));

    match entry {
        Some(entry) => package_dir.join(entry),
        None => package_dir.join("index.js"),
    }
}

/// Detect module format from extension, then the nearest package.json "type"
async fn detect_format(path: &Path) -> ModuleFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mjs") => return ModuleFormat::Module,
        Some("cjs") => return ModuleFormat::CommonJs,
        Some("json") => return ModuleFormat::Json,
        _ => {}
    }

    let mut current = path.parent();
    while let Some(dir) = current {
        if let Some(pkg) = PackageJson::read(&dir.join("package.json")).await {
            return match pkg.type_field.as_deref() {
                Some("module") => ModuleFormat::Module,
                _ => ModuleFormat::CommonJs,
            };
        }
        current = dir.parent();
    }

    ModuleFormat::CommonJs
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn context_in(dir: &Path) -> ResolveContext {
        ResolveContext::from_parent_path(&dir.join("main.js")).unwrap()
    }

    #[test]
    fn test_is_builtin() {
        let resolver = NodeResolver::new();
        assert!(resolver.is_builtin("fs"));
        assert!(resolver.is_builtin("node:fs"));
        assert!(resolver.is_builtin("fs/promises"));
        assert!(resolver.is_builtin("node:stream/web"));
        assert!(resolver.is_builtin("node:test"));
        // Only reachable through the scheme
        assert!(!resolver.is_builtin("test"));
        assert!(!resolver.is_builtin("fs/extra"));
        assert!(!resolver.is_builtin("lodash"));
        assert!(!resolver.is_builtin("node:lodash"));
    }

    #[test]
    fn test_package_specifier() {
        let parse = PackageSpecifier::parse;
        let spec = |name, subpath| Some(PackageSpecifier { name, subpath });

        assert_eq!(parse("lodash"), spec("lodash", None));
        assert_eq!(parse("lodash/"), spec("lodash", None));
        assert_eq!(parse("lodash/fp/get"), spec("lodash", Some("fp/get")));
        assert_eq!(parse("@types/node"), spec("@types/node", None));
        assert_eq!(parse("@babel/core/lib/index"), spec("@babel/core", Some("lib/index")));
        assert_eq!(parse("@babel"), None);
        assert_eq!(parse("@/core"), None);
        assert_eq!(parse(""), None);
    }

    #[tokio::test]
    async fn test_resolve_builtin_subpath() {
        let resolver = NodeResolver::new();

        let resolved = resolver
            .resolve("fs/promises", &ResolveContext::default())
            .await
            .unwrap();
        assert_eq!(resolved.url.as_str(), "node:fs/promises");
        assert_eq!(resolved.format, Some(ModuleFormat::Builtin));

        assert!(matches!(
            resolver.resolve("node:nope", &ResolveContext::default()).await,
            Err(ResolveError::Other(_))
        ));
        assert!(matches!(
            resolver.resolve("@scope", &ResolveContext::default()).await,
            Err(ResolveError::ModuleNotFound { url: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_builtin() {
        let resolved = NodeResolver::new()
            .resolve("node:path", &ResolveContext::default())
            .await
            .unwrap();
        assert_eq!(resolved.url.as_str(), "node:path");
        assert_eq!(resolved.format, Some(ModuleFormat::Builtin));
    }

    #[tokio::test]
    async fn test_strict_relative_resolution() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("util.mjs"), "export {};").unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();

        let resolver = NodeResolver::new();
        let context = context_in(dir.path());

        let resolved = resolver.resolve("./util.mjs", &context).await.unwrap();
        assert_eq!(resolved.format, Some(ModuleFormat::Module));

        assert!(matches!(
            resolver.resolve("./util", &context).await,
            Err(ResolveError::ModuleNotFound { url: Some(_), .. })
        ));
        assert!(matches!(
            resolver.resolve("./lib", &context).await,
            Err(ResolveError::UnsupportedDirImport { .. })
        ));
    }

    #[tokio::test]
    async fn test_package_type_detection() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"type": "module"}"#).unwrap();
        std::fs::write(dir.path().join("app.js"), "export {};").unwrap();

        let resolved = NodeResolver::new()
            .resolve("./app.js", &context_in(dir.path()))
            .await
            .unwrap();
        assert_eq!(resolved.format, Some(ModuleFormat::Module));
    }

    #[tokio::test]
    async fn test_resolve_package() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules").join("widget");
        std::fs::create_dir_all(pkg.join("dist")).unwrap();
        std::fs::write(pkg.join("package.json"), r#"{"main": "dist/widget.js"}"#).unwrap();
        std::fs::write(pkg.join("dist").join("widget.js"), "module.exports = {};").unwrap();

        let resolver = NodeResolver::new();
        let context = context_in(dir.path());

        let resolved = resolver.resolve("widget", &context).await.unwrap();
        assert!(resolved.url.as_str().ends_with("/node_modules/widget/dist/widget.js"));

        match resolver.resolve("not-installed", &context).await {
            Err(ResolveError::ModuleNotFound { url, .. }) => assert!(url.is_none()),
            other => panic!("expected ModuleNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fs_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let loaded = FsLoader.load(&url, &LoadContext::default()).await.unwrap();
        assert_eq!(loaded.source.as_deref(), Some(r#"{"a": 1}"#));
        assert_eq!(loaded.format, ModuleFormat::Json);

        let builtin = Url::parse("node:fs").unwrap();
        let loaded = FsLoader.load(&builtin, &LoadContext::default()).await.unwrap();
        assert!(loaded.source.is_none());
    }
}
