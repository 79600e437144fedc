//! Environment variable key constants and aliases.
//!
//! Primary keys use the `PHASEKIT_*` prefix.

/// Plugin catalog and project locations
pub mod paths {
    pub const PHASEKIT_PLUGIN_DIR: &str = "PHASEKIT_PLUGIN_DIR";
    pub const PLUGIN_DIR_ALIASES: &[&str] = &["PHASEKIT_CATALOG_DIR"];

    pub const PHASEKIT_PROJECT_ROOT: &str = "PHASEKIT_PROJECT_ROOT";
}

/// Plugin loading (local/remote) and compilation
pub mod loader {
    /// Seconds before a remote plugin fetch is abandoned. Unset = no timeout.
    pub const PHASEKIT_FETCH_TIMEOUT_SECS: &str = "PHASEKIT_FETCH_TIMEOUT_SECS";
    /// "1" enables the content-addressed AST cache.
    pub const PHASEKIT_COMPILE_CACHE: &str = "PHASEKIT_COMPILE_CACHE";
}

/// Script sandbox limits and host bindings
pub mod sandbox {
    pub const PHASEKIT_SANDBOX_MAX_OPERATIONS: &str = "PHASEKIT_SANDBOX_MAX_OPERATIONS";
    pub const PHASEKIT_SANDBOX_MAX_CALL_LEVELS: &str = "PHASEKIT_SANDBOX_MAX_CALL_LEVELS";
    /// Comma-separated env var names exposed to scripts as `HOST.env`.
    pub const PHASEKIT_SANDBOX_ALLOW_ENV: &str = "PHASEKIT_SANDBOX_ALLOW_ENV";
}

/// Observability and logging
pub mod observability {
    pub const PHASEKIT_QUIET: &str = "PHASEKIT_QUIET";
    pub const QUIET_ALIASES: &[&str] = &[];

    pub const PHASEKIT_LOG_LEVEL: &str = "PHASEKIT_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["PHASEKIT_LOG"];

    pub const PHASEKIT_LOG_JSON: &str = "PHASEKIT_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &[];
}
