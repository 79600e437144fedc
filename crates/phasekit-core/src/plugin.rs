//! The plugin contract shared by built-in, native and script plugins.
//!
//! A plugin exposes a name and an asynchronous `run`. Completion is the
//! returned `Result`: it resolves exactly once, carrying either success or a
//! [`PluginError`] the orchestrator uses to decide whether to continue.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors a plugin reports from `run`.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin '{plugin}' failed: {reason}")]
    Failed { plugin: String, reason: String },

    #[error("plugin '{plugin}' script error: {reason}")]
    Script { plugin: String, reason: String },

    #[error("plugin '{plugin}' was aborted before completing")]
    Aborted { plugin: String },
}

impl PluginError {
    pub fn failed(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }
}

/// Context handed to every plugin's `run`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginContext {
    /// Root of the project being built.
    pub project_root: PathBuf,
    /// Action the pipeline was resolved for.
    pub action: String,
    /// Whether only the terminal phase was resolved.
    pub only: bool,
    /// Free-form options forwarded from the project configuration.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl PluginContext {
    pub fn new(project_root: impl Into<PathBuf>, action: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            action: action.into(),
            only: false,
            options: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_only(mut self, only: bool) -> Self {
        self.only = only;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: serde_json::Map<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }
}

/// Minimal capability contract every plugin satisfies.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name, used for logging and diagnostics.
    fn name(&self) -> &str;

    /// Perform the plugin's work.
    async fn run(&self, ctx: &PluginContext) -> Result<(), PluginError>;
}

/// A resolved plugin plus the phase that introduced it.
#[derive(Clone)]
pub struct PluginHandle {
    plugin: Arc<dyn Plugin>,
    parent_phase: Option<String>,
}

impl PluginHandle {
    pub fn new(plugin: Arc<dyn Plugin>) -> Self {
        Self {
            plugin,
            parent_phase: None,
        }
    }

    /// Record which phase introduced this instance.
    #[must_use]
    pub fn with_parent(mut self, phase: impl Into<String>) -> Self {
        self.parent_phase = Some(phase.into());
        self
    }

    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    pub fn parent_phase(&self) -> Option<&str> {
        self.parent_phase.as_deref()
    }

    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    pub async fn run(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.plugin.run(ctx).await
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("name", &self.name())
            .field("parent_phase", &self.parent_phase)
            .finish()
    }
}

type RunFn = dyn Fn(&PluginContext) -> Result<(), PluginError> + Send + Sync;

/// Plugin built from a bare function by [`create`].
pub struct FnPlugin {
    name: String,
    run: Box<RunFn>,
}

#[async_trait]
impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        (self.run)(ctx)
    }
}

/// Build a conforming plugin from a name and a run function.
pub fn create<F>(name: impl Into<String>, run: F) -> Arc<dyn Plugin>
where
    F: Fn(&PluginContext) -> Result<(), PluginError> + Send + Sync + 'static,
{
    Arc::new(FnPlugin {
        name: name.into(),
        run: Box::new(run),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_create_runs_closure_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let plugin = create("count", move |ctx| {
            assert_eq!(ctx.action, "build");
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let handle = PluginHandle::new(plugin).with_parent("build");
        assert_eq!(handle.name(), "count");
        assert_eq!(handle.parent_phase(), Some("build"));

        handle.run(&PluginContext::new("/tmp", "build")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_propagates_failure() {
        let plugin = create("broken", |_| Err(PluginError::failed("broken", "boom")));
        let err = plugin.run(&PluginContext::default()).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_handle_debug_shows_name_and_phase() {
        let handle = PluginHandle::new(create("x", |_| Ok(()))).with_parent("clean");
        let shown = format!("{:?}", handle);
        assert!(shown.contains("\"x\""));
        assert!(shown.contains("clean"));
    }
}
