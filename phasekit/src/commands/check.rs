use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use phasekit_core::config::PathsConfig;
use phasekit_sandbox::{Compiler, SandboxConfig};

/// Compile a plugin script and report whether it satisfies the plugin contract.
pub fn cmd_check(script: &str, project: Option<&str>) -> Result<()> {
    let path = Path::new(script);
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let root = project
        .map(PathBuf::from)
        .unwrap_or_else(|| PathsConfig::from_env().project_root);
    let import_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let compiler = Compiler::new(root, SandboxConfig::from_env());
    let exports = compiler.compile_at(&code, script, import_dir)?;
    let plugin = exports.into_plugin()?;
    println!("ok: {} exports plugin '{}'", script, phasekit_core::Plugin::name(&plugin));
    Ok(())
}
