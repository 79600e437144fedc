//! Sources tree scanner.
//!
//! A sources root holds `config.json` and one directory per module; each
//! module directory holds one directory per version. A module directory
//! with its own `config.json` is a nested root. Roots are processed from an
//! explicit worklist.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Result, SourcesError};
use crate::packager::{ensure_tarball, STAGING_DIR};

pub const CONFIG_FILE: &str = "config.json";

/// Metadata record handed off for one module version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    /// Nested root name; empty for the top-level root.
    pub root: String,
    pub name: String,
    pub version: String,
    /// Relative file path → "" for every shipped file.
    pub output: BTreeMap<String, String>,
}

/// Scan `dir`, packaging every module version and returning its records.
pub fn scan(dir: &Path) -> Result<Vec<ModuleRecord>> {
    let config = dir.join(CONFIG_FILE);
    if !config.is_file() {
        return Err(SourcesError::MissingConfig(config));
    }

    let mut records = Vec::new();
    let mut pending: VecDeque<(String, PathBuf)> = VecDeque::new();
    pending.push_back((String::new(), dir.to_path_buf()));

    while let Some((root, base)) = pending.pop_front() {
        read_config(&base.join(CONFIG_FILE))?;
        let staging = StagingDir::new(base.join(STAGING_DIR));

        for module in module_dirs(&base)? {
            let module_path = base.join(&module);
            if module_path.join(CONFIG_FILE).is_file() {
                tracing::debug!(root = %module, "Nested sources root");
                pending.push_back((module, module_path));
                continue;
            }

            for version in list_dirs(&module_path)? {
                tracing::info!("Parsing module {}@{}", module, version);
                let version_dir = module_path.join(&version);
                ensure_tarball(staging.path(), &module, &version, &version_dir)?;
                records.push(ModuleRecord {
                    root: root.clone(),
                    name: module.clone(),
                    version,
                    output: shipped_files(&version_dir)?,
                });
            }
        }

        staging.remove()?;
    }

    tracing::info!(modules = records.len(), "Module scan complete");
    Ok(records)
}

/// Staging tree of one root. Removed by [`StagingDir::remove`], or on drop
/// when a scan bails out early.
struct StagingDir {
    path: Option<PathBuf>,
}

impl StagingDir {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }

    fn remove(mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => remove_if_present(&path),
            None => Ok(()),
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = remove_if_present(&path) {
                tracing::warn!("Failed to clean up staging dir: {}", e);
            }
        }
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| SourcesError::io(path, e))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).map_err(|e| SourcesError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| SourcesError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Module directories: skips names starting with `.` or `_`.
fn module_dirs(base: &Path) -> Result<Vec<String>> {
    Ok(list_dirs(base)?
        .into_iter()
        .filter(|name| !name.starts_with('.') && !name.starts_with('_'))
        .collect())
}

fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SourcesError::io(dir, e))? {
        let entry = entry.map_err(|e| SourcesError::io(dir, e))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Files with an extension, excluding `.json`, `.tgz` and `-debug.js`.
/// Hidden entries are filtered out before this is consulted.
pub fn is_shipped(rel: &str) -> bool {
    let has_ext = Path::new(rel).extension().is_some();
    has_ext && !rel.ends_with(".json") && !rel.ends_with(".tgz") && !rel.ends_with("-debug.js")
}

fn shipped_files(version_dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut output = BTreeMap::new();
    let visible = WalkDir::new(version_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));
    for entry in visible {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(version_dir) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        if is_shipped(&rel) {
            output.insert(rel, String::new());
        }
    }
    Ok(output)
}
