//! Project-level before/after plugin overrides and the splice that applies
//! them to a phase.

use std::collections::BTreeMap;

use phasekit_core::PluginHandle;
use serde::{Deserialize, Deserializer};

/// Plugin specs to run before and after one phase's built-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhaseOverride {
    #[serde(default, deserialize_with = "one_or_many")]
    pub before: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub after: Vec<String>,
}

impl PhaseOverride {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Phase name → override, as written in the project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct UserOverrides(pub BTreeMap<String, PhaseOverride>);

impl UserOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the `plugins` key of a project config value.
    /// A missing or null key means no overrides.
    pub fn from_project_config(config: &serde_json::Value) -> serde_json::Result<Self> {
        match config.get("plugins") {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => Self::deserialize(v),
        }
    }

    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>, ov: PhaseOverride) -> Self {
        self.0.insert(phase.into(), ov);
        self
    }

    pub fn get(&self, phase: &str) -> Option<&PhaseOverride> {
        self.0.get(phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PhaseOverride)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// A phase override with its specs materialized. Slots that failed to load
/// are already gone; survivors keep their declared order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPhaseOverride {
    pub before: Vec<PluginHandle>,
    pub after: Vec<PluginHandle>,
}

/// Phase name → materialized override.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOverrides(pub BTreeMap<String, ResolvedPhaseOverride>);

impl ResolvedOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, phase: &str) -> Option<&ResolvedPhaseOverride> {
        self.0.get(phase)
    }

    pub fn insert(&mut self, phase: impl Into<String>, ov: ResolvedPhaseOverride) {
        self.0.insert(phase.into(), ov);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splice `before` ahead of and `after` behind a phase's built-ins.
/// Built-ins are never reordered, duplicated or dropped.
pub fn merge(
    builtins: Vec<PluginHandle>,
    overrides: Option<&ResolvedPhaseOverride>,
) -> Vec<PluginHandle> {
    let Some(ov) = overrides else {
        return builtins;
    };
    let mut merged = Vec::with_capacity(ov.before.len() + builtins.len() + ov.after.len());
    merged.extend(ov.before.iter().cloned());
    merged.extend(builtins);
    merged.extend(ov.after.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasekit_core::create;

    fn handle(name: &str) -> PluginHandle {
        PluginHandle::new(create(name, |_| Ok(())))
    }

    fn names(list: &[PluginHandle]) -> Vec<&str> {
        list.iter().map(|h| h.name()).collect()
    }

    #[test]
    fn test_merge_before_and_after() {
        let builtins = vec![handle("b1"), handle("b2")];
        let ov = ResolvedPhaseOverride {
            before: vec![handle("x"), handle("y")],
            after: vec![handle("z")],
        };
        assert_eq!(
            names(&merge(builtins, Some(&ov))),
            ["x", "y", "b1", "b2", "z"]
        );
    }

    #[test]
    fn test_merge_without_override_is_identity() {
        let merged = merge(vec![handle("b1"), handle("b2")], None);
        assert_eq!(names(&merged), ["b1", "b2"]);

        let empty = ResolvedPhaseOverride::default();
        let merged = merge(vec![handle("b1")], Some(&empty));
        assert_eq!(names(&merged), ["b1"]);
    }

    #[test]
    fn test_deserialize_project_plugins() {
        let config = serde_json::json!({
            "name": "app",
            "plugins": {
                "analyse": { "after": ["./depCheck2.rhai"] },
                "build": { "before": "./banner.rhai", "after": null },
                "deploy": {}
            }
        });
        let ov = UserOverrides::from_project_config(&config).unwrap();
        assert_eq!(ov.get("analyse").unwrap().after, ["./depCheck2.rhai"]);
        assert!(ov.get("analyse").unwrap().before.is_empty());
        assert_eq!(ov.get("build").unwrap().before, ["./banner.rhai"]);
        assert!(ov.get("build").unwrap().after.is_empty());
        assert!(ov.get("deploy").unwrap().is_empty());

        let none = UserOverrides::from_project_config(&serde_json::json!({})).unwrap();
        assert!(none.is_empty());
    }
}
