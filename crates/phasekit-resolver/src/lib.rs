//! phasekit-resolver: decides which plugins run, in which order, for an action.
//!
//! - **lifecycle**: fixed phase table and secondary action bindings
//! - **catalog**: tool-shipped built-ins (native or `.rhai`)
//! - **loader**: project overrides from local paths or HTTP(S)
//! - **overrides**: before/after splicing
//! - **resolver**: `get_plugins(action, only, overrides)`

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod overrides;
pub mod resolver;

pub use catalog::PluginCatalog;
pub use error::{LifecycleError, LoadError};
pub use lifecycle::{ActionBindings, Lifecycle, Phase, PhaseTable};
pub use loader::PluginLoader;
pub use overrides::{PhaseOverride, ResolvedOverrides, ResolvedPhaseOverride, UserOverrides};
pub use resolver::ActionResolver;
