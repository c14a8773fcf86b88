// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! One-time installation of the loader into a host.
//!
//! A host exposes either resolve/load hooks ([`HookHost`]) or a
//! content-interception plugin system ([`PluginHost`]). Installing twice in
//! the same process is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::hooks::LoaderHooks;
use crate::plugin::StylesheetPlugin;

/// Host accepting resolve/load hooks
pub trait HookHost {
    /// Put `hooks` in front of the host's own resolution and loading
    fn register_hooks(&self, hooks: Arc<LoaderHooks>);
}

/// Host accepting content-interception plugins
pub trait PluginHost {
    /// Register `plugin` for paths matching its filter
    fn register_plugin(&self, plugin: Arc<StylesheetPlugin>);
}

/// Hook system the loader is installed into
#[derive(Clone, Copy)]
pub enum Host<'a> {
    /// Resolve/load hook chain
    ModuleHooks(&'a dyn HookHost),
    /// Build-time content-interception plugins
    Plugin(&'a dyn PluginHost),
}

/// Install-once guard
#[derive(Debug, Default)]
pub struct Registration {
    registered: AtomicBool,
}

impl Registration {
    /// Create a guard with nothing installed
    pub const fn new() -> Self {
        Self {
            registered: AtomicBool::new(false),
        }
    }

    /// Install the loader into `host` unless this guard already did.
    ///
    /// Returns whether the loader was installed by this call.
    pub fn install(&self, host: Host<'_>, config: LoaderConfig) -> bool {
        if self
            .registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("jopi-loader already registered");
            return false;
        }

        let config = Arc::new(config);
        match host {
            Host::ModuleHooks(host) => {
                debug!("Registering jopi-loader resolve/load hooks");
                host.register_hooks(Arc::new(LoaderHooks::with_config(config)));
            }
            Host::Plugin(host) => {
                debug!("Registering jopi-loader plugin");
                host.register_plugin(Arc::new(StylesheetPlugin::new(config)));
            }
        }
        true
    }

    /// Whether the loader was installed through this guard
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}

static REGISTRATION: Registration = Registration::new();

/// Install the loader into `host`, once per process.
pub fn install(host: Host<'_>, config: LoaderConfig) -> bool {
    REGISTRATION.install(host, config)
}

/// Whether the loader was installed in this process
pub fn is_installed() -> bool {
    REGISTRATION.is_registered()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingHost {
        hooks: AtomicUsize,
        plugins: AtomicUsize,
    }

    impl HookHost for CountingHost {
        fn register_hooks(&self, _hooks: Arc<LoaderHooks>) {
            self.hooks.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl PluginHost for CountingHost {
        fn register_plugin(&self, _plugin: Arc<StylesheetPlugin>) {
            self.plugins.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_install_once() {
        let guard = Registration::new();
        let host = CountingHost::default();

        assert!(!guard.is_registered());
        assert!(guard.install(Host::ModuleHooks(&host), LoaderConfig::default()));
        assert!(!guard.install(Host::ModuleHooks(&host), LoaderConfig::default()));
        assert!(!guard.install(Host::Plugin(&host), LoaderConfig::default()));

        assert!(guard.is_registered());
        assert_eq!(host.hooks.load(Ordering::SeqCst), 1);
        assert_eq!(host.plugins.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_install_plugin() {
        let guard = Registration::new();
        let host = CountingHost::default();

        assert!(guard.install(Host::Plugin(&host), LoaderConfig::default()));
        assert_eq!(host.plugins.load(Ordering::SeqCst), 1);
        assert_eq!(host.hooks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_process_wide_install() {
        let host = CountingHost::default();

        // Nothing else in this binary touches the process-wide guard
        assert!(!is_installed());
        assert!(install(Host::Plugin(&host), LoaderConfig::default()));
        assert!(is_installed());
        assert!(!install(Host::ModuleHooks(&host), LoaderConfig::default()));

        assert_eq!(host.plugins.load(Ordering::SeqCst), 1);
        assert_eq!(host.hooks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_install() {
        let guard = Arc::new(Registration::new());
        let host = Arc::new(CountingHost::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let host = Arc::clone(&host);
                std::thread::spawn(move || {
                    guard.install(Host::ModuleHooks(host.as_ref()), LoaderConfig::default())
                })
            })
            .collect();

        let installed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|installed| *installed)
            .count();

        assert_eq!(installed, 1);
        assert_eq!(host.hooks.load(Ordering::SeqCst), 1);
    }
}
