pub mod config;
pub mod observability;
pub mod path_validation;
pub mod plugin;
pub mod spec;

pub use plugin::{create, Plugin, PluginContext, PluginError, PluginHandle};
pub use spec::PluginSpec;
