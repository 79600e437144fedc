//! Unified configuration layer.
//!
//! All environment variable reads live here; the rest of the workspace goes
//! through the structured configs instead of calling `std::env::var` directly.
//!
//! - `loader`: env_or, env_optional, env_bool helpers and `.env` loading
//! - `schema`: PathsConfig, LoaderConfig, ObservabilityConfig
//! - `env_keys`: key constants (with aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_list, env_optional, env_or, env_u64, load_dotenv};
pub use schema::{LoaderConfig, ObservabilityConfig, PathsConfig};
