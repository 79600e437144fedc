//! The fixed build lifecycle: ordered phases and their built-in plugins.
//!
//! Built once at startup and passed by reference; nothing here is mutable
//! after construction.

use std::collections::BTreeMap;

use crate::error::LifecycleError;

/// A named lifecycle stage with its ordered built-in plugin names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub name: String,
    pub builtins: Vec<String>,
}

impl Phase {
    pub fn new<I, S>(name: impl Into<String>, builtins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            builtins: builtins.into_iter().map(Into::into).collect(),
        }
    }
}

/// Standard phases, in execution order.
const STANDARD_PHASES: &[(&str, &[&str])] = &[
    ("clean", &["clean"]),
    ("resources", &["resources"]),
    ("compile", &["coffee", "less"]),
    ("analyse", &["jshint", "loadSourceConfig", "dependencies", "depCheck"]),
    ("preBuild", &["tpl", "css", "define"]),
    ("output", &["output"]),
    ("build", &["compress", "install"]),
    ("upload", &["pack", "upload"]),
    ("deploy", &["deploy"]),
];

/// Ordered, uniquely named phases.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    /// Build a table, rejecting empty or duplicate phase names.
    pub fn new(phases: Vec<Phase>) -> Result<Self, LifecycleError> {
        let mut seen = std::collections::HashSet::new();
        for (i, phase) in phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                return Err(LifecycleError::EmptyPhaseName(i));
            }
            if !seen.insert(phase.name.as_str()) {
                return Err(LifecycleError::DuplicatePhase(phase.name.clone()));
            }
        }
        Ok(Self { phases })
    }

    pub fn standard() -> Self {
        Self {
            phases: STANDARD_PHASES
                .iter()
                .map(|(name, builtins)| Phase::new(*name, builtins.iter().copied()))
                .collect(),
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Position of the phase named `name`. Plugin names never match.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Phases from the first through `action`, or empty when no phase has
    /// that name.
    pub fn phases_for(&self, action: &str) -> &[Phase] {
        match self.index_of(action) {
            Some(i) => &self.phases[..=i],
            None => &[],
        }
    }
}

/// Secondary action → plugin table for actions that are not phases.
#[derive(Debug, Clone, Default)]
pub struct ActionBindings {
    bindings: BTreeMap<String, Vec<String>>,
}

impl ActionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an action to a single plugin (stored as a one-element list).
    #[must_use]
    pub fn bind_one(self, action: impl Into<String>, plugin: impl Into<String>) -> Self {
        self.bind(action, [plugin.into()])
    }

    /// Bind an action to an ordered list of plugins.
    #[must_use]
    pub fn bind<I, S>(mut self, action: impl Into<String>, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bindings
            .insert(action.into(), plugins.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, action: &str) -> Option<&[String]> {
        self.bindings.get(action).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Phase table plus action bindings.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    pub phases: PhaseTable,
    pub bindings: ActionBindings,
}

impl Lifecycle {
    pub fn new(phases: PhaseTable, bindings: ActionBindings) -> Self {
        Self { phases, bindings }
    }

    /// Standard phases with no extra action bindings.
    pub fn standard() -> Self {
        Self::new(PhaseTable::standard(), ActionBindings::new())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let table = PhaseTable::standard();
        let names: Vec<&str> = table.phases().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "clean", "resources", "compile", "analyse", "preBuild", "output", "build",
                "upload", "deploy"
            ]
        );
        assert_eq!(
            table.get("analyse").unwrap().builtins,
            ["jshint", "loadSourceConfig", "dependencies", "depCheck"]
        );
    }

    #[test]
    fn test_phases_for() {
        let table = PhaseTable::standard();
        let upto: Vec<&str> = table
            .phases_for("compile")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(upto, ["clean", "resources", "compile"]);
        assert_eq!(table.phases_for("deploy").len(), 9);
        assert!(table.phases_for("depCheck").is_empty());
        assert!(table.phases_for("nope").is_empty());
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let err = PhaseTable::new(vec![Phase::new("a", ["x"]), Phase::new("a", ["y"])]).unwrap_err();
        assert_eq!(err, LifecycleError::DuplicatePhase("a".into()));

        let err = PhaseTable::new(vec![Phase::new("a", ["x"]), Phase::new(" ", ["y"])]).unwrap_err();
        assert_eq!(err, LifecycleError::EmptyPhaseName(1));

        assert!(PhaseTable::new(vec![Phase::new("only", Vec::<String>::new())]).is_ok());
    }

    #[test]
    fn test_bindings_normalized_to_lists() {
        let bindings = ActionBindings::new()
            .bind_one("lint", "jshint")
            .bind("ship", ["pack", "upload"]);
        assert_eq!(bindings.get("lint").unwrap(), ["jshint"]);
        assert_eq!(bindings.get("ship").unwrap(), ["pack", "upload"]);
        assert!(bindings.get("other").is_none());
    }
}
