//! ActionResolver: turns an action into the ordered plugin list.

use std::sync::Arc;

use phasekit_core::PluginHandle;

use crate::catalog::PluginCatalog;
use crate::lifecycle::{Lifecycle, Phase};
use crate::overrides::{merge, ResolvedOverrides};

/// Resolves actions against a fixed lifecycle and catalog.
///
/// Resolution is synchronous; overrides must already be materialized by
/// [`crate::PluginLoader::load_overrides`].
#[derive(Debug, Clone)]
pub struct ActionResolver {
    lifecycle: Arc<Lifecycle>,
    catalog: PluginCatalog,
}

impl ActionResolver {
    pub fn new(lifecycle: Arc<Lifecycle>, catalog: PluginCatalog) -> Self {
        Self { lifecycle, catalog }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Ordered plugins for `action`.
    ///
    /// A phase name resolves every phase up to and including it (or just that
    /// phase when `only`). Anything else is tried as a single built-in, then
    /// as an action binding. An empty result is a valid no-op.
    pub fn get_plugins(
        &self,
        action: &str,
        only: bool,
        overrides: &ResolvedOverrides,
    ) -> Vec<PluginHandle> {
        let phases = &self.lifecycle.phases;
        if let Some(index) = phases.index_of(action) {
            let in_scope = if only {
                &phases.phases()[index..=index]
            } else {
                phases.phases_for(action)
            };
            return in_scope
                .iter()
                .flat_map(|phase| self.resolve_phase(phase, overrides))
                .collect();
        }

        if let Some(handle) = self.catalog.get_plugin(action, action) {
            return vec![handle];
        }

        if let Some(bound) = self.lifecycle.bindings.get(action) {
            tracing::debug!(action, plugins = ?bound, "Using action binding");
            return bound
                .iter()
                .filter_map(|name| self.catalog.get_plugin(name, action))
                .collect();
        }

        tracing::debug!(action, "No plugins for action");
        Vec::new()
    }

    /// One phase: its built-ins in declared order with the override spliced in.
    pub fn resolve_phase(&self, phase: &Phase, overrides: &ResolvedOverrides) -> Vec<PluginHandle> {
        let builtins = phase
            .builtins
            .iter()
            .filter_map(|name| self.catalog.get_plugin(name, &phase.name))
            .collect();
        merge(builtins, overrides.get(&phase.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ActionBindings, PhaseTable};
    use crate::overrides::ResolvedPhaseOverride;
    use phasekit_core::create;
    use phasekit_sandbox::{Compiler, SandboxConfig};

    fn resolver(bindings: ActionBindings) -> ActionResolver {
        let tmp = std::env::temp_dir();
        let mut catalog = PluginCatalog::new(None, Compiler::new(tmp, SandboxConfig::default()));
        for phase in PhaseTable::standard().phases() {
            for name in &phase.builtins {
                let n = name.clone();
                catalog = catalog.register_native(name.clone(), move || create(n.clone(), |_| Ok(())));
            }
        }
        catalog = catalog.register_native("extra", || create("extra", |_| Ok(())));
        ActionResolver::new(
            Arc::new(Lifecycle::new(PhaseTable::standard(), bindings)),
            catalog,
        )
    }

    fn names(list: &[PluginHandle]) -> Vec<&str> {
        list.iter().map(|h| h.name()).collect()
    }

    #[test]
    fn test_phase_action_includes_prior_phases() {
        let r = resolver(ActionBindings::new());
        let list = r.get_plugins("compile", false, &ResolvedOverrides::new());
        assert_eq!(names(&list), ["clean", "resources", "coffee", "less"]);
        assert_eq!(list[2].parent_phase(), Some("compile"));
    }

    #[test]
    fn test_only_resolves_terminal_phase() {
        let r = resolver(ActionBindings::new());
        let mut ov = ResolvedOverrides::new();
        ov.insert(
            "upload",
            ResolvedPhaseOverride {
                before: vec![PluginHandle::new(create("sign", |_| Ok(()))).with_parent("upload")],
                after: vec![],
            },
        );
        let list = r.get_plugins("upload", true, &ov);
        assert_eq!(names(&list), ["sign", "pack", "upload"]);
    }

    #[test]
    fn test_builtin_name_as_action() {
        let r = resolver(ActionBindings::new());
        let list = r.get_plugins("depCheck", false, &ResolvedOverrides::new());
        assert_eq!(names(&list), ["depCheck"]);
        assert_eq!(list[0].parent_phase(), Some("depCheck"));
    }

    #[test]
    fn test_binding_then_empty() {
        let r = resolver(ActionBindings::new().bind("lint", ["jshint", "missing", "extra"]));
        let list = r.get_plugins("lint", false, &ResolvedOverrides::new());
        assert_eq!(names(&list), ["jshint", "extra"]);
        assert_eq!(list[1].parent_phase(), Some("lint"));

        assert!(r
            .get_plugins("unknown", false, &ResolvedOverrides::new())
            .is_empty());
    }
}
