//! Interpreter resource limits.
//!
//! These bound runaway scripts (infinite loops, deep recursion, huge strings);
//! they are not a defense against hostile code.

use phasekit_core::config::{env_keys::sandbox as keys, env_u64, load_dotenv};

/// Default maximum operations per script call (0 = unlimited)
pub const DEFAULT_MAX_OPERATIONS: u64 = 10_000_000;

/// Default maximum function call nesting
pub const DEFAULT_MAX_CALL_LEVELS: usize = 64;

/// Default maximum expression nesting (global level, inside functions)
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 64;
pub const DEFAULT_MAX_FN_EXPR_DEPTH: usize = 32;

/// Default maximum string length in bytes
pub const DEFAULT_MAX_STRING_SIZE: usize = 4 * 1024 * 1024;

/// Default maximum array / map entries
pub const DEFAULT_MAX_ARRAY_SIZE: usize = 100_000;
pub const DEFAULT_MAX_MAP_SIZE: usize = 100_000;

/// Default maximum modules a script may import
pub const DEFAULT_MAX_MODULES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_fn_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
    pub max_modules: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
            max_fn_expr_depth: DEFAULT_MAX_FN_EXPR_DEPTH,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            max_map_size: DEFAULT_MAX_MAP_SIZE,
            max_modules: DEFAULT_MAX_MODULES,
        }
    }
}

impl SandboxLimits {
    /// Defaults, with operation and call-level limits overridable from env.
    pub fn from_env() -> Self {
        load_dotenv();
        let mut limits = Self::default();
        if let Some(ops) = env_u64(keys::PHASEKIT_SANDBOX_MAX_OPERATIONS, &[]) {
            limits.max_operations = ops;
        }
        if let Some(levels) = env_u64(keys::PHASEKIT_SANDBOX_MAX_CALL_LEVELS, &[]) {
            limits.max_call_levels = levels as usize;
        }
        limits
    }

    #[must_use]
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }

    pub(crate) fn apply(&self, engine: &mut rhai::Engine) {
        engine.set_max_operations(self.max_operations);
        engine.set_max_call_levels(self.max_call_levels);
        engine.set_max_expr_depths(self.max_expr_depth, self.max_fn_expr_depth);
        engine.set_max_string_size(self.max_string_size);
        engine.set_max_array_size(self.max_array_size);
        engine.set_max_map_size(self.max_map_size);
        engine.set_max_modules(self.max_modules);
    }
}
