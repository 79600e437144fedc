//! Per-version `.tgz` packages.
//!
//! Archive layout: `<name>/dist/<files...>`. The version directory is copied
//! into a staging tree first so the archive being written is never part of
//! its own input. Archives are written to a temp file and renamed into place,
//! so `<name>.tgz` either is complete or does not exist.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{Result, SourcesError};

/// Staging directory created under each sources root.
pub const STAGING_DIR: &str = "_build";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    Created(PathBuf),
    /// `<name>.tgz` was already present and left untouched.
    Existing(PathBuf),
}

impl PackOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Existing(p) => p,
        }
    }
}

pub fn tarball_name(module: &str) -> String {
    format!("{}.tgz", module)
}

/// Create `<version_dir>/<module>.tgz` unless it exists, staging under
/// `<staging_root>/<module>/<version>/<module>/dist`.
pub fn ensure_tarball(
    staging_root: &Path,
    module: &str,
    version: &str,
    version_dir: &Path,
) -> Result<PackOutcome> {
    let target = version_dir.join(tarball_name(module));
    if target.exists() {
        tracing::debug!(module, version, "Package exists, skipping");
        return Ok(PackOutcome::Existing(target));
    }

    let stage_module = staging_root.join(module).join(version).join(module);
    let stage_dist = stage_module.join("dist");
    copy_tree(version_dir, &stage_dist)?;

    write_archive(&target, module, &stage_module)?;

    tracing::info!("Packed {}", target.display());
    Ok(PackOutcome::Created(target))
}

/// Archive `stage_module` as `<module>/...` into `target`. On error the temp
/// file is dropped and `target` is untouched.
fn write_archive(target: &Path, module: &str, stage_module: &Path) -> Result<()> {
    let dir = target.parent().unwrap_or(Path::new("."));
    let tmp = NamedTempFile::new_in(dir).map_err(|e| SourcesError::io(dir, e))?;

    let mut builder = tar::Builder::new(GzEncoder::new(tmp, Compression::default()));
    builder
        .append_dir_all(module, stage_module)
        .map_err(|e| SourcesError::io(stage_module, e))?;
    let tmp = builder
        .into_inner()
        .and_then(|gz| gz.finish())
        .map_err(|e| SourcesError::io(target, e))?;

    tmp.persist(target)
        .map_err(|e| SourcesError::io(target, e.error))?;
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).map_err(|e| SourcesError::io(to, e))?;
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = match entry.path().strip_prefix(from) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| SourcesError::io(&dest, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest).map_err(|e| SourcesError::io(&dest, e))?;
        }
    }
    Ok(())
}
