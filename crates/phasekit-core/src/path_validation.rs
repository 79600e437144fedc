//! Path validation utilities.
//!
//! Keeps script-supplied paths inside the project root and normalizes
//! relative plugin specs without touching the filesystem.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Leading `..` on a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `relative` against `root` and normalize the result.
pub fn resolve_against(root: &Path, relative: &str) -> PathBuf {
    normalize(&root.join(relative))
}

/// Validate that `path` stays within `root`. Prevents path traversal.
///
/// Relative paths are joined onto `root`. The target does not need to exist;
/// the check is made on the canonical root and the normalized target.
pub fn validate_path_under_root(root: &Path, path: &str, path_type: &str) -> Result<PathBuf> {
    let allowed_root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Invalid root {}: {}", root.display(), e))?;
    let input = Path::new(path);
    let full = if input.is_absolute() {
        normalize(input)
    } else {
        normalize(&allowed_root.join(input))
    };
    let checked = full.canonicalize().unwrap_or(full);
    if !checked.starts_with(&allowed_root) {
        anyhow::bail!("{} escapes allowed root: {}", path_type, path);
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_components() {
        assert_eq!(normalize(Path::new("/a/b/./c/../d")), PathBuf::from("/a/b/d"));
        assert_eq!(normalize(Path::new("./x/../y.rhai")), PathBuf::from("y.rhai"));
        assert_eq!(normalize(Path::new("../up.rhai")), PathBuf::from("../up.rhai"));
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_resolve_against_root() {
        let resolved = resolve_against(Path::new("/proj"), "./plugins/../depCheck2.rhai");
        assert_eq!(resolved, PathBuf::from("/proj/depCheck2.rhai"));
    }

    #[test]
    fn test_validate_path_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "x").unwrap();

        let ok = validate_path_under_root(tmp.path(), "a.txt", "File").unwrap();
        assert!(ok.ends_with("a.txt"));

        let missing = validate_path_under_root(tmp.path(), "sub/new.txt", "File");
        assert!(missing.is_ok());

        let escaped = validate_path_under_root(tmp.path(), "../outside.txt", "File");
        assert!(escaped.is_err());
        assert!(escaped.unwrap_err().to_string().contains("escapes allowed root"));
    }
}
