//! PluginLoader: materializes user-supplied plugin specs.
//!
//! Local paths are read from disk relative to the project root; URLs are
//! fetched over HTTP(S). Either way the source is compiled in the sandbox,
//! on the blocking pool so a slow script never stalls sibling loads.
//! Every failure is logged exactly once and the slot is dropped, so one bad
//! spec never affects its siblings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use phasekit_core::path_validation::resolve_against;
use phasekit_core::{PluginHandle, PluginSpec};
use phasekit_sandbox::Compiler;

use crate::error::LoadError;
use crate::overrides::{ResolvedOverrides, ResolvedPhaseOverride, UserOverrides};

#[derive(Debug, Clone)]
pub struct PluginLoader {
    project_root: PathBuf,
    compiler: Compiler,
    client: reqwest::Client,
}

impl PluginLoader {
    /// `fetch_timeout` bounds remote fetches only; `None` never times out.
    pub fn new(compiler: Compiler, fetch_timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = fetch_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("HTTP client setup failed, using defaults: {}", e);
            reqwest::Client::new()
        });
        Self {
            project_root: compiler.project_root().to_path_buf(),
            compiler,
            client,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Classify an override spec. Bare names are catalog-only and not
    /// accepted here.
    pub fn classify(raw: &str) -> Result<PluginSpec, LoadError> {
        match PluginSpec::parse(raw) {
            Some(spec @ (PluginSpec::LocalPath(_) | PluginSpec::RemoteUrl(_))) => Ok(spec),
            _ => Err(LoadError::Unsupported(raw.to_string())),
        }
    }

    /// Load one spec. `None` after exactly one warning on any failure.
    pub async fn load(&self, raw: &str) -> Option<PluginHandle> {
        match self.try_load(raw).await {
            Ok(handle) => {
                tracing::debug!(spec = raw, plugin = handle.name(), "Loaded plugin");
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(spec = raw, "Unable to load plugin: {}", e);
                None
            }
        }
    }

    async fn try_load(&self, raw: &str) -> Result<PluginHandle, LoadError> {
        let (code, identifier, import_dir) = match Self::classify(raw)? {
            PluginSpec::LocalPath(rel) => {
                let path = resolve_against(&self.project_root, &rel);
                if !path.is_file() {
                    return Err(LoadError::NotFound(path.display().to_string()));
                }
                let code = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                let import_dir = path.parent().unwrap_or(&self.project_root).to_path_buf();
                (code, raw.to_string(), import_dir)
            }
            PluginSpec::RemoteUrl(url) => {
                let code = self.fetch(&url).await?;
                (code, url, self.project_root.clone())
            }
            PluginSpec::Builtin(name) => return Err(LoadError::Unsupported(name)),
        };

        let compiler = self.compiler.clone();
        let task = tokio::task::spawn_blocking(move || {
            compiler
                .compile_at(&code, &identifier, &import_dir)?
                .into_plugin()
        });
        let plugin = task
            .await
            .map_err(|_| LoadError::Aborted(raw.to_string()))??;
        Ok(PluginHandle::new(Arc::new(plugin)))
    }

    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let network = |reason: String| LoadError::Network {
            url: url.to_string(),
            reason,
        };
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {}", status)));
        }
        resp.text().await.map_err(|e| network(e.to_string()))
    }

    /// Load a list of specs concurrently; survivors keep declared order.
    pub async fn load_all(&self, specs: &[String], phase: &str) -> Vec<PluginHandle> {
        join_all(specs.iter().map(|spec| self.load(spec)))
            .await
            .into_iter()
            .flatten()
            .map(|handle| handle.with_parent(phase))
            .collect()
    }

    /// Materialize every phase override. Phases, their before/after groups
    /// and the specs within a group all load concurrently.
    pub async fn load_overrides(&self, overrides: &UserOverrides) -> ResolvedOverrides {
        let phases = overrides.iter().map(|(phase, ov)| async move {
            let (before, after) = tokio::join!(
                self.load_all(&ov.before, phase),
                self.load_all(&ov.after, phase)
            );
            (phase.clone(), ResolvedPhaseOverride { before, after })
        });

        let mut resolved = ResolvedOverrides::new();
        for (phase, ov) in join_all(phases).await {
            resolved.insert(phase, ov);
        }
        resolved
    }
}
