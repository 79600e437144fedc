//! phasekit-sources: scans a module sources tree, packs each module version
//! as `<name>.tgz` and produces `{ name, version, output }` records.

pub mod error;
pub mod packager;
pub mod scanner;

pub use error::SourcesError;
pub use packager::{ensure_tarball, PackOutcome};
pub use scanner::{scan, ModuleRecord};
