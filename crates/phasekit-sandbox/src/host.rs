//! Capabilities exposed to plugin scripts.
//!
//! Nothing ambient is reachable from a script: the engine has no file or
//! network access of its own, and env vars are copied in only when
//! allow-listed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use phasekit_core::path_validation::validate_path_under_root;
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Map, Module};

/// Name of the filesystem utility module (`fs::read(...)`).
pub const FS_MODULE: &str = "fs";

/// Host-side inputs used to populate a sandbox.
#[derive(Debug, Clone)]
pub struct HostBindings {
    pub project_root: PathBuf,
    /// Env var names copied into `HOST.env`.
    pub allow_env: Vec<String>,
}

impl HostBindings {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            allow_env: Vec::new(),
        }
    }

    /// Restricted, read-only copy of ambient host bindings.
    pub fn host_map(&self) -> Map {
        let mut env = Map::new();
        for key in &self.allow_env {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.as_str().into(), value.into());
            }
        }

        let mut host = Map::new();
        host.insert("tool".into(), "phasekit".into());
        host.insert("version".into(), env!("CARGO_PKG_VERSION").into());
        host.insert("os".into(), std::env::consts::OS.into());
        host.insert("arch".into(), std::env::consts::ARCH.into());
        host.insert(
            "project_root".into(),
            self.project_root.display().to_string().into(),
        );
        host.insert("env".into(), Dynamic::from_map(env));
        host
    }

    /// Read-only filesystem module confined to the project root.
    pub fn fs_module(&self) -> Module {
        let root = Arc::new(self.project_root.clone());
        let mut module = Module::new();

        let r = root.clone();
        module.set_native_fn(
            "exists",
            move |path: ImmutableString| -> Result<bool, Box<EvalAltResult>> {
                Ok(confined(&r, &path).map(|p| p.exists()).unwrap_or(false))
            },
        );

        let r = root.clone();
        module.set_native_fn(
            "is_dir",
            move |path: ImmutableString| -> Result<bool, Box<EvalAltResult>> {
                Ok(confined(&r, &path).map(|p| p.is_dir()).unwrap_or(false))
            },
        );

        let r = root.clone();
        module.set_native_fn(
            "read",
            move |path: ImmutableString| -> Result<String, Box<EvalAltResult>> {
                let full = confined(&r, &path)?;
                std::fs::read_to_string(&full)
                    .map_err(|e| format!("fs::read {}: {}", path, e).into())
            },
        );

        let r = root;
        module.set_native_fn(
            "list",
            move |path: ImmutableString| -> Result<Array, Box<EvalAltResult>> {
                let full = confined(&r, &path)?;
                let entries = std::fs::read_dir(&full)
                    .map_err(|e| -> Box<EvalAltResult> { format!("fs::list {}: {}", path, e).into() })?;
                let mut names: Vec<String> = entries
                    .flatten()
                    .map(|entry| entry.file_name().to_string_lossy().to_string())
                    .collect();
                names.sort();
                Ok(names.into_iter().map(Dynamic::from).collect())
            },
        );

        module
    }
}

fn confined(root: &Path, path: &str) -> Result<PathBuf, Box<EvalAltResult>> {
    validate_path_under_root(root, path, "Path").map_err(|e| e.to_string().into())
}

/// Register the base plugin factory: `plugin(name, run)` returns a map that
/// satisfies the export contract without sharing any host type.
pub fn register_plugin_factory(engine: &mut Engine) {
    engine.register_fn("plugin", |name: ImmutableString, run: FnPtr| -> Map {
        let mut map = Map::new();
        map.insert("name".into(), Dynamic::from(name));
        map.insert("run".into(), Dynamic::from(run));
        map
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_map_only_copies_allowed_env() {
        let mut bindings = HostBindings::new("/proj");
        bindings.allow_env = vec!["PATH".to_string(), "PHASEKIT_TEST_UNSET_VAR".to_string()];
        let host = bindings.host_map();

        assert_eq!(host["tool"].clone().into_string().unwrap(), "phasekit");
        assert_eq!(host["project_root"].clone().into_string().unwrap(), "/proj");
        let env = host["env"].clone().cast::<Map>();
        assert!(!env.contains_key("PHASEKIT_TEST_UNSET_VAR"));
        assert!(env.len() <= 1);
    }

    #[test]
    fn test_fs_module_confined_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "hello").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        let mut engine = Engine::new();
        engine.register_static_module(
            FS_MODULE,
            HostBindings::new(tmp.path()).fs_module().into(),
        );

        assert_eq!(
            engine.eval::<String>(r#"fs::read("a.txt")"#).unwrap(),
            "hello"
        );
        assert!(engine.eval::<bool>(r#"fs::exists("a.txt")"#).unwrap());
        assert!(engine.eval::<bool>(r#"fs::is_dir("sub")"#).unwrap());
        assert!(!engine.eval::<bool>(r#"fs::exists("../a.txt")"#).unwrap());
        assert_eq!(
            engine.eval::<Array>(r#"fs::list(".")"#).unwrap().len(),
            2
        );
        assert!(engine.eval::<String>(r#"fs::read("../../etc/passwd")"#).is_err());
    }
}
