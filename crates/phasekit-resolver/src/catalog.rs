//! PluginCatalog: looks up tool-shipped plugins by bare name.
//!
//! Lookup order: native registrations, then `<catalog_dir>/<name>.rhai`
//! compiled through the sandbox. A miss of any kind logs one warning and
//! yields `None`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use phasekit_core::spec::is_plugin_name;
use phasekit_core::{Plugin, PluginHandle};
use phasekit_sandbox::Compiler;

use crate::error::LoadError;

/// File extension of catalog scripts.
pub const SCRIPT_EXT: &str = "rhai";

type NativeFactory = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Built-in plugin lookup.
#[derive(Clone)]
pub struct PluginCatalog {
    dir: Option<PathBuf>,
    compiler: Compiler,
    native: HashMap<String, NativeFactory>,
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut native: Vec<&String> = self.native.keys().collect();
        native.sort();
        f.debug_struct("PluginCatalog")
            .field("dir", &self.dir)
            .field("native", &native)
            .finish()
    }
}

impl PluginCatalog {
    pub fn new(dir: Option<PathBuf>, compiler: Compiler) -> Self {
        Self {
            dir,
            compiler,
            native: HashMap::new(),
        }
    }

    /// Register a native plugin factory. Each lookup calls the factory, so
    /// every resolution gets its own instance.
    #[must_use]
    pub fn register_native<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.native.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Resolve `name`, tagging the result with `parent_phase`.
    pub fn get_plugin(&self, name: &str, parent_phase: &str) -> Option<PluginHandle> {
        match self.lookup(name) {
            Ok(plugin) => {
                tracing::debug!(plugin = name, phase = parent_phase, "Resolved built-in plugin");
                Some(PluginHandle::new(plugin).with_parent(parent_phase))
            }
            Err(e) => {
                tracing::warn!(
                    plugin = name,
                    phase = parent_phase,
                    "Built-in plugin unavailable: {}",
                    e
                );
                None
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn Plugin>, LoadError> {
        if let Some(factory) = self.native.get(name) {
            return Ok(factory());
        }
        // Names double as file stems; anything else could escape the dir.
        if !is_plugin_name(name) {
            return Err(LoadError::NotFound(name.to_string()));
        }
        let dir = self
            .dir
            .as_deref()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        let path = dir.join(format!("{}.{}", name, SCRIPT_EXT));
        if !path.is_file() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }
        let code = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let plugin = self
            .compiler
            .compile_at(&code, name, dir)?
            .into_plugin()?;
        Ok(Arc::new(plugin))
    }

    /// Every name this catalog can resolve, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.native.keys().cloned().collect();
        if let Some(dir) = &self.dir {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXT) {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        if is_plugin_name(stem) {
                            names.push(stem.to_string());
                        }
                    }
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }
}
