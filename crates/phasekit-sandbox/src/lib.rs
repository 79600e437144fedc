//! Script sandbox for phasekit plugins.
//!
//! Every [`Compiler::compile`] builds a fresh Rhai engine and scope, so state a
//! plugin script defines never outlives its own compilation and never reaches
//! host process state. Scripts see only the capabilities registered in
//! [`host`]: the `HOST` bindings, `PLUGIN_ID`, the `exports` slot, a sandbox
//! local `GLOBAL` map, the `plugin(name, run)` factory and the `fs` module.

pub mod cache;
pub mod compiler;
pub mod error;
pub mod host;
pub mod limits;
pub mod plugin;

pub use compiler::{Compiler, SandboxConfig, ScriptExports};
pub use error::SandboxError;
pub use limits::SandboxLimits;
pub use plugin::ScriptPlugin;
