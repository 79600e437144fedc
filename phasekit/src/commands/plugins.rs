use anyhow::Result;
use serde::Serialize;

use super::{toolchain, Project};
use crate::cli::ProjectArgs;

#[derive(Debug, Serialize)]
struct PluginEntry<'a> {
    name: &'a str,
    phase: Option<&'a str>,
}

/// Resolve and print the plugin list for `action`.
pub async fn cmd_plugins(action: &str, only: bool, args: &ProjectArgs, json: bool) -> Result<()> {
    let project = Project::load(args)?;
    let (resolver, loader) = toolchain(&project.root);
    let overrides = loader.load_overrides(&project.overrides).await;
    let list = resolver.get_plugins(action, only, &overrides);

    if json {
        let entries: Vec<PluginEntry> = list
            .iter()
            .map(|h| PluginEntry {
                name: h.name(),
                phase: h.parent_phase(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if list.is_empty() {
        println!("No plugins for '{}'", action);
    }
    for handle in &list {
        println!("{:<10} {}", handle.parent_phase().unwrap_or("-"), handle.name());
    }
    Ok(())
}
