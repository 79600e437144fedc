//! Configuration structs grouped by concern, loaded from the environment.

use super::env_keys::{loader as loader_keys, observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or, env_u64};
use std::path::PathBuf;
use std::time::Duration;

/// Catalog and project locations.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Tool-shipped plugin catalog directory, if one could be located.
    pub plugin_dir: Option<PathBuf>,
    /// Root that relative plugin specs are resolved against.
    pub project_root: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let plugin_dir = env_optional(paths::PHASEKIT_PLUGIN_DIR, paths::PLUGIN_DIR_ALIASES)
            .map(PathBuf::from)
            .or_else(default_plugin_dir);
        let project_root = env_optional(paths::PHASEKIT_PROJECT_ROOT, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self {
            plugin_dir,
            project_root,
        }
    }
}

/// Catalog shipped next to the executable: `<exe_dir>/plugins`, then
/// `<exe_dir>/../share/phasekit/plugins`.
fn default_plugin_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe_dir = exe.parent()?;
    let candidates = [
        exe_dir.join("plugins"),
        exe_dir.join("..").join("share").join("phasekit").join("plugins"),
    ];
    candidates.into_iter().find(|p| p.is_dir())
}

/// Plugin loader behavior.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Remote fetch timeout. `None` keeps the unbounded default.
    pub fetch_timeout_secs: Option<u64>,
    /// Reuse parsed ASTs for identical sources.
    pub compile_cache: bool,
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            fetch_timeout_secs: env_u64(loader_keys::PHASEKIT_FETCH_TIMEOUT_SECS, &[])
                .filter(|secs| *secs > 0),
            compile_cache: env_bool(loader_keys::PHASEKIT_COMPILE_CACHE, &[], false),
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

/// Observability: quiet, log_level, log_json.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::PHASEKIT_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(
                    obv_keys::PHASEKIT_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "phasekit=info".to_string(),
                ),
                log_json: env_bool(obv_keys::PHASEKIT_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_timeout() {
        let cfg = LoaderConfig {
            fetch_timeout_secs: Some(5),
            compile_cache: false,
        };
        assert_eq!(cfg.fetch_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(LoaderConfig::default().fetch_timeout(), None);
    }
}
