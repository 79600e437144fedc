use anyhow::{Context, Result};
use phasekit_core::PluginContext;

use super::{toolchain, Project};
use crate::cli::ProjectArgs;

/// Resolve `action` and await each plugin in order. The first failure stops
/// the pipeline; nothing is retried.
pub async fn cmd_run(action: &str, only: bool, args: &ProjectArgs) -> Result<()> {
    let project = Project::load(args)?;
    let (resolver, loader) = toolchain(&project.root);
    let overrides = loader.load_overrides(&project.overrides).await;
    let list = resolver.get_plugins(action, only, &overrides);

    if list.is_empty() {
        tracing::info!(action, "Nothing to run");
        return Ok(());
    }

    let ctx = PluginContext::new(&project.root, action)
        .with_only(only)
        .with_options(project.options);
    for (i, handle) in list.iter().enumerate() {
        tracing::info!(
            step = i + 1,
            total = list.len(),
            phase = handle.parent_phase().unwrap_or("-"),
            "Running {}",
            handle.name()
        );
        handle
            .run(&ctx)
            .await
            .with_context(|| format!("'{}' failed, stopping '{}'", handle.name(), action))?;
    }
    tracing::info!(action, plugins = list.len(), "Done");
    Ok(())
}
