//! Plugins backed by a compiled script's `run` function pointer.

use std::sync::Arc;

use async_trait::async_trait;
use phasekit_core::{Plugin, PluginContext, PluginError};
use rhai::{Dynamic, Engine, FnPtr, Map, AST};

use crate::compiler::{ScriptBindings, GLOBAL_VAR, HOST_VAR, PLUGIN_ID_VAR};

/// A plugin whose `run` is a script function.
///
/// The script function receives the context as a map, extended with `HOST`,
/// `PLUGIN_ID` and the script's `GLOBAL`. Returning normally is success;
/// `throw` is reported as [`PluginError::Script`].
#[derive(Clone)]
pub struct ScriptPlugin {
    name: String,
    identifier: String,
    run: FnPtr,
    bindings: ScriptBindings,
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl ScriptPlugin {
    pub(crate) fn new(
        name: String,
        identifier: String,
        run: FnPtr,
        bindings: ScriptBindings,
        engine: Arc<Engine>,
        ast: Arc<AST>,
    ) -> Self {
        Self {
            name,
            identifier,
            run,
            bindings,
            engine,
            ast,
        }
    }

    /// Where the script came from (path, URL or catalog name).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl std::fmt::Debug for ScriptPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptPlugin")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .finish()
    }
}

#[async_trait]
impl Plugin for ScriptPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &PluginContext) -> Result<(), PluginError> {
        let mut map = rhai::serde::to_dynamic(ctx)
            .map_err(|e| PluginError::Script {
                plugin: self.name.clone(),
                reason: format!("context conversion failed: {}", e),
            })?
            .try_cast::<Map>()
            .unwrap_or_default();
        map.insert(HOST_VAR.into(), Dynamic::from_map(self.bindings.host.clone()));
        map.insert(PLUGIN_ID_VAR.into(), self.identifier.clone().into());
        map.insert(GLOBAL_VAR.into(), self.bindings.global.clone());
        let arg = Dynamic::from_map(map);

        let engine = self.engine.clone();
        let ast = self.ast.clone();
        let run = self.run.clone();
        let outcome =
            tokio::task::spawn_blocking(move || run.call::<Dynamic>(&engine, &ast, (arg,))).await;

        match outcome {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PluginError::Script {
                plugin: self.name.clone(),
                reason: e.to_string(),
            }),
            Err(join_err) => {
                tracing::warn!(plugin = %self.name, "Script run aborted: {}", join_err);
                Err(PluginError::Aborted {
                    plugin: self.name.clone(),
                })
            }
        }
    }
}
