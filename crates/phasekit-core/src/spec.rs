//! Plugin references: the literal forms a plugin string can take.

use std::fmt;

/// Where a plugin implementation comes from, derived from its literal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSpec {
    /// Name looked up in the tool-shipped catalog.
    Builtin(String),
    /// Path relative to the project root (`./x.rhai`, `../x.rhai`).
    LocalPath(String),
    /// Absolute HTTP(S) URL.
    RemoteUrl(String),
}

const RELATIVE_MARKERS: &[&str] = &["./", "../", ".\\", "..\\"];
const REMOTE_SCHEMES: &[&str] = &["http://", "https://"];

impl PluginSpec {
    /// Classify a spec string. Returns `None` for unsupported forms
    /// (absolute paths, other URL schemes, empty or malformed names).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if RELATIVE_MARKERS.iter().any(|m| raw.starts_with(m)) {
            return Some(Self::LocalPath(raw.to_string()));
        }
        let lower = raw.to_ascii_lowercase();
        if REMOTE_SCHEMES
            .iter()
            .any(|s| lower.starts_with(s) && lower.len() > s.len())
        {
            return Some(Self::RemoteUrl(raw.to_string()));
        }
        if is_plugin_name(raw) {
            return Some(Self::Builtin(raw.to_string()));
        }
        None
    }

    /// The literal form this spec was parsed from.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Builtin(s) | Self::LocalPath(s) | Self::RemoteUrl(s) => s,
        }
    }
}

impl fmt::Display for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog names: a letter or `_`, then letters, digits, `_` or `-`.
pub fn is_plugin_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
