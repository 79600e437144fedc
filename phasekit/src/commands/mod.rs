//! CLI command implementations.
//!
//! Shared setup: project discovery, override loading and the
//! resolver/loader pair every resolving command needs.

pub mod check;
pub mod phases;
pub mod plugins;
pub mod run;
pub mod sources;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use phasekit_core::config::{LoaderConfig, PathsConfig};
use phasekit_resolver::{ActionResolver, Lifecycle, PluginCatalog, PluginLoader, UserOverrides};
use phasekit_sandbox::{Compiler, SandboxConfig};

use crate::cli::ProjectArgs;

/// Default project config file, relative to the project root.
pub const DEFAULT_PROJECT_CONFIG: &str = "package.json";

/// A project as seen by the resolving commands.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub overrides: UserOverrides,
    /// Project config minus its `plugins` key, forwarded to plugins.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Locate the project and read its config. A missing config file means
    /// no overrides.
    pub fn load(args: &ProjectArgs) -> Result<Self> {
        let root = match &args.project {
            Some(dir) => PathBuf::from(dir),
            None => PathsConfig::from_env().project_root,
        };
        let config_path = args
            .config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join(DEFAULT_PROJECT_CONFIG));
        let (overrides, options) = read_project_config(&config_path)?;
        Ok(Self {
            root,
            overrides,
            options,
        })
    }
}

fn read_project_config(
    path: &Path,
) -> Result<(UserOverrides, serde_json::Map<String, serde_json::Value>)> {
    if !path.is_file() {
        tracing::debug!("No project config at {}, no overrides", path.display());
        return Ok((UserOverrides::new(), serde_json::Map::new()));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let overrides = UserOverrides::from_project_config(&value)
        .with_context(|| format!("Invalid `plugins` section in {}", path.display()))?;
    let mut options = match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    options.remove("plugins");
    Ok((overrides, options))
}

/// Resolver over the standard lifecycle and the shipped catalog, plus the
/// loader for project overrides. Both share one compiler.
pub fn toolchain(project_root: &Path) -> (ActionResolver, PluginLoader) {
    let paths = PathsConfig::from_env();
    if paths.plugin_dir.is_none() {
        tracing::warn!("No plugin catalog found; set PHASEKIT_PLUGIN_DIR");
    }
    let compiler = Compiler::new(project_root, SandboxConfig::from_env());
    let catalog = PluginCatalog::new(paths.plugin_dir, compiler.clone());
    let resolver = ActionResolver::new(Arc::new(Lifecycle::standard()), catalog);
    let loader = PluginLoader::new(compiler, LoaderConfig::from_env().fetch_timeout());
    (resolver, loader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_project_config_means_no_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let (overrides, options) = read_project_config(&tmp.path().join("package.json")).unwrap();
        assert!(overrides.is_empty());
        assert!(options.is_empty());
    }

    #[test]
    fn test_project_config_split_into_overrides_and_options() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("package.json");
        std::fs::write(
            &path,
            r#"{"name": "app", "version": "1.0.0", "plugins": {"build": {"after": ["./notify.rhai"]}}}"#,
        )
        .unwrap();
        let (overrides, options) = read_project_config(&path).unwrap();
        assert_eq!(overrides.get("build").unwrap().after, ["./notify.rhai"]);
        assert_eq!(options["name"], "app");
        assert!(!options.contains_key("plugins"));
    }

    #[test]
    fn test_malformed_project_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("package.json");
        std::fs::write(&path, r#"{"plugins": {"build": {"after": 3}}}"#).unwrap();
        assert!(read_project_config(&path).is_err());
    }
}
