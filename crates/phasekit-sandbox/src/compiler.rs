//! Compile plugin source text into its exports.
//!
//! Each call constructs an isolated engine and scope pre-populated with the
//! host capabilities, runs the script exactly once, and returns whatever it
//! left in `exports`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use phasekit_core::config::{env_keys::sandbox as keys, env_list, LoaderConfig};
use rhai::module_resolvers::{FileModuleResolver, ModuleResolversCollection, StaticModuleResolver};
use rhai::{Dynamic, Engine, Map, Scope, AST};

use crate::cache::AstCache;
use crate::error::SandboxError;
use crate::host::{self, HostBindings, FS_MODULE};
use crate::limits::SandboxLimits;
use crate::plugin::ScriptPlugin;

/// Scope variable scripts assign their exports to.
pub const EXPORTS_VAR: &str = "exports";
/// Read-only host bindings.
pub const HOST_VAR: &str = "HOST";
/// Identifier of the script being compiled.
pub const PLUGIN_ID_VAR: &str = "PLUGIN_ID";
/// Sandbox-local global map.
pub const GLOBAL_VAR: &str = "GLOBAL";

/// Sandbox configuration shared by all compilations of one compiler.
#[derive(Debug, Clone, Default)]
pub struct SandboxConfig {
    pub limits: SandboxLimits,
    /// Env var names copied into `HOST.env`.
    pub allow_env: Vec<String>,
    /// Reuse parsed ASTs for identical (identifier, source) pairs.
    pub compile_cache: bool,
}

impl SandboxConfig {
    pub fn from_env() -> Self {
        Self {
            limits: SandboxLimits::from_env(),
            allow_env: env_list(keys::PHASEKIT_SANDBOX_ALLOW_ENV, &[]),
            compile_cache: LoaderConfig::from_env().compile_cache,
        }
    }
}

/// Compiles plugin scripts for one project.
#[derive(Debug, Clone)]
pub struct Compiler {
    bindings: HostBindings,
    limits: SandboxLimits,
    cache: Option<Arc<AstCache>>,
}

impl Compiler {
    pub fn new(project_root: impl Into<PathBuf>, config: SandboxConfig) -> Self {
        let mut bindings = HostBindings::new(project_root);
        bindings.allow_env = config.allow_env;
        Self {
            bindings,
            limits: config.limits,
            cache: config.compile_cache.then(|| Arc::new(AstCache::new())),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.bindings.project_root
    }

    /// Compile `code`, resolving `import` statements against the project root.
    pub fn compile(&self, code: &str, identifier: &str) -> Result<ScriptExports, SandboxError> {
        let import_dir = self.bindings.project_root.clone();
        self.compile_at(code, identifier, &import_dir)
    }

    /// Compile `code`, resolving file imports against `import_dir`.
    pub fn compile_at(
        &self,
        code: &str,
        identifier: &str,
        import_dir: &Path,
    ) -> Result<ScriptExports, SandboxError> {
        let engine = Arc::new(self.build_engine(identifier, import_dir));
        let ast = self.parse(&engine, code, identifier)?;

        let host = self.bindings.host_map();
        // Shared so writes from `run` and from top-level code see one map.
        let global = Dynamic::from_map(Map::new()).into_shared();

        let mut scope = Scope::new();
        scope.push_constant(HOST_VAR, Dynamic::from_map(host.clone()));
        scope.push_constant(PLUGIN_ID_VAR, identifier.to_string());
        scope.push(EXPORTS_VAR, Map::new());
        scope.push(GLOBAL_VAR, global.clone());

        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| SandboxError::Runtime {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;

        // Anything other than a map (including unit) exports nothing.
        let values = scope
            .get_value::<Dynamic>(EXPORTS_VAR)
            .and_then(|v| v.try_cast::<Map>())
            .unwrap_or_default();

        tracing::debug!(
            plugin = identifier,
            exports = ?values.keys().collect::<Vec<_>>(),
            "Compiled plugin script"
        );

        Ok(ScriptExports {
            identifier: identifier.to_string(),
            values,
            bindings: ScriptBindings { host, global },
            engine,
            ast,
        })
    }

    fn parse(&self, engine: &Engine, code: &str, identifier: &str) -> Result<Arc<AST>, SandboxError> {
        let key = self.cache.as_ref().map(|_| AstCache::key(identifier, code));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(ast) = cache.get(key) {
                tracing::debug!(plugin = identifier, "Reusing cached AST");
                return Ok(ast);
            }
        }

        // No AST source: the file resolver would resolve imports against it
        // instead of the import dir.
        let ast = engine.compile(code).map_err(|e| SandboxError::Parse {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;
        let ast = Arc::new(ast);

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, ast.clone());
        }
        Ok(ast)
    }

    fn build_engine(&self, identifier: &str, import_dir: &Path) -> Engine {
        let mut engine = Engine::new();
        self.limits.apply(&mut engine);

        let id = identifier.to_string();
        engine.on_print(move |text| {
            tracing::info!(target: "phasekit::script", plugin = %id, "{}", text);
        });
        let id = identifier.to_string();
        engine.on_debug(move |text, source, pos| {
            tracing::debug!(
                target: "phasekit::script",
                plugin = %id,
                source = source.unwrap_or_default(),
                position = %pos,
                "{}",
                text
            );
        });

        let fs = Arc::new(self.bindings.fs_module());
        engine.register_static_module(FS_MODULE, fs);
        host::register_plugin_factory(&mut engine);

        // Host-provided modules first, then `.rhai` files beside the script.
        let mut statics = StaticModuleResolver::new();
        statics.insert(FS_MODULE, self.bindings.fs_module());
        let mut files = FileModuleResolver::new_with_path(import_dir);
        files.enable_cache(false);
        let mut resolvers = ModuleResolversCollection::new();
        resolvers.push(statics);
        resolvers.push(files);
        engine.set_module_resolver(resolvers);

        engine
    }
}

/// Sandbox values a script's `run` sees on its context map.
#[derive(Clone)]
pub(crate) struct ScriptBindings {
    pub(crate) host: Map,
    /// Shared with the compile-time `GLOBAL`.
    pub(crate) global: Dynamic,
}

/// Whatever a script assigned to `exports`, plus the engine and AST its
/// function pointers need.
#[derive(Clone)]
pub struct ScriptExports {
    identifier: String,
    values: Map,
    bindings: ScriptBindings,
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl std::fmt::Debug for ScriptExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptExports")
            .field("identifier", &self.identifier)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptExports {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.values.get(key)
    }

    /// Validate the export contract (`name: string`, `run: Fn`) and wrap the
    /// exports as a plugin.
    pub fn into_plugin(self) -> Result<ScriptPlugin, SandboxError> {
        let invalid = |reason: &str| SandboxError::InvalidExport {
            identifier: self.identifier.clone(),
            reason: reason.to_string(),
        };

        let name = self
            .values
            .get("name")
            .and_then(|v| v.clone().into_string().ok())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| invalid("missing string `name`"))?;
        let run = self
            .values
            .get("run")
            .and_then(|v| v.clone().try_cast::<rhai::FnPtr>())
            .ok_or_else(|| invalid("missing function `run`"))?;

        Ok(ScriptPlugin::new(
            name,
            self.identifier,
            run,
            self.bindings,
            self.engine,
            self.ast,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasekit_core::{Plugin, PluginContext};

    fn compiler(root: &Path) -> Compiler {
        Compiler::new(root, SandboxConfig::default())
    }

    #[tokio::test]
    async fn test_compile_exports_runnable_plugin() {
        let tmp = tempfile::tempdir().unwrap();
        let code = r#"
            exports.name = "t";
            exports.run = |ctx| { };
        "#;
        let exports = compiler(tmp.path()).compile(code, "t.rhai").unwrap();
        let plugin = exports.into_plugin().unwrap();
        assert_eq!(plugin.name(), "t");
        plugin
            .run(&PluginContext::new(tmp.path(), "build"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_plugin_factory_and_context() {
        let tmp = tempfile::tempdir().unwrap();
        let code = r#"
            fn check(ctx) {
                if ctx.action != "build" { throw "wrong action: " + ctx.action; }
            }
            exports = plugin("factory", Fn("check"));
        "#;
        let plugin = compiler(tmp.path())
            .compile(code, "factory.rhai")
            .unwrap()
            .into_plugin()
            .unwrap();
        plugin
            .run(&PluginContext::new(tmp.path(), "build"))
            .await
            .unwrap();
        let err = plugin
            .run(&PluginContext::new(tmp.path(), "deploy"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("wrong action: deploy"));
    }

    #[tokio::test]
    async fn test_named_run_sees_host_id_and_global() {
        let tmp = tempfile::tempdir().unwrap();
        let code = r#"
            GLOBAL.count = 1;
            fn run(ctx) {
                if ctx.HOST.tool != "phasekit" { throw "no host"; }
                if ctx.PLUGIN_ID != "counter.rhai" { throw "wrong id: " + ctx.PLUGIN_ID; }
                ctx.GLOBAL.count += 1;
                if ctx.GLOBAL.count != 2 { throw "count " + ctx.GLOBAL.count; }
            }
            exports = plugin("counter", Fn("run"));
        "#;
        let plugin = compiler(tmp.path())
            .compile(code, "counter.rhai")
            .unwrap()
            .into_plugin()
            .unwrap();
        plugin
            .run(&PluginContext::new(tmp.path(), "build"))
            .await
            .unwrap();

        // The increment persisted across runs.
        let err = plugin
            .run(&PluginContext::new(tmp.path(), "build"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("count 3"));
    }

    #[test]
    fn test_nothing_exported_is_empty_not_error() {
        let tmp = tempfile::tempdir().unwrap();
        let c = compiler(tmp.path());

        let exports = c.compile("let x = 1;", "noop.rhai").unwrap();
        assert!(exports.is_empty());

        let exports = c.compile("exports = ();", "unit.rhai").unwrap();
        assert!(exports.is_empty());

        let err = exports.into_plugin().unwrap_err();
        assert!(matches!(err, SandboxError::InvalidExport { .. }));
    }

    #[test]
    fn test_top_level_throw_is_runtime_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = compiler(tmp.path())
            .compile(r#"throw "boom";"#, "throws.rhai")
            .unwrap_err();
        assert!(matches!(err, SandboxError::Runtime { .. }));
        assert_eq!(err.identifier(), "throws.rhai");
    }

    #[test]
    fn test_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = compiler(tmp.path())
            .compile("exports.name = ;", "bad.rhai")
            .unwrap_err();
        assert!(matches!(err, SandboxError::Parse { .. }));
    }

    #[test]
    fn test_globals_do_not_leak_between_compilations() {
        let tmp = tempfile::tempdir().unwrap();
        let c = compiler(tmp.path());

        c.compile("GLOBAL.leak = 42; let stray = 1;", "first.rhai").unwrap();
        let exports = c
            .compile(
                "exports.seen = GLOBAL.len(); exports.id = PLUGIN_ID;",
                "second.rhai",
            )
            .unwrap();
        assert_eq!(exports.get("seen").unwrap().as_int().unwrap(), 0);
        assert_eq!(
            exports.get("id").unwrap().clone().into_string().unwrap(),
            "second.rhai"
        );
        assert!(c.compile("stray", "third.rhai").is_err());
    }

    #[test]
    fn test_host_constants_are_read_only() {
        let tmp = tempfile::tempdir().unwrap();
        let err = compiler(tmp.path())
            .compile(r#"HOST = #{};"#, "mutate.rhai")
            .unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Runtime { .. } | SandboxError::Parse { .. }
        ));
    }

    #[test]
    fn test_operation_limit_stops_runaway_script() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SandboxConfig {
            limits: SandboxLimits::default().with_max_operations(1_000),
            ..SandboxConfig::default()
        };
        let err = Compiler::new(tmp.path(), config)
            .compile("loop { }", "spin.rhai")
            .unwrap_err();
        assert!(matches!(err, SandboxError::Runtime { .. }));
    }

    #[test]
    fn test_imports_resolve_beside_project_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("helpers.rhai"), "fn greet() { \"hi\" }").unwrap();
        std::fs::write(tmp.path().join("data.txt"), "payload").unwrap();
        let code = r#"
            import "helpers" as h;
            import "fs" as files;
            exports.greeting = h::greet();
            exports.data = files::read("data.txt");
            exports.direct = fs::exists("data.txt");
        "#;
        let exports = compiler(tmp.path()).compile(code, "imports.rhai").unwrap();
        assert_eq!(
            exports.get("greeting").unwrap().clone().into_string().unwrap(),
            "hi"
        );
        assert_eq!(
            exports.get("data").unwrap().clone().into_string().unwrap(),
            "payload"
        );
        assert!(exports.get("direct").unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_compile_cache_reuses_ast_but_reruns_script() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SandboxConfig {
            compile_cache: true,
            ..SandboxConfig::default()
        };
        let c = Compiler::new(tmp.path(), config);
        let code = "GLOBAL.n = 1; exports.n = GLOBAL.n;";
        let a = c.compile(code, "cached.rhai").unwrap();
        let b = c.compile(code, "cached.rhai").unwrap();
        assert!(Arc::ptr_eq(&a.ast, &b.ast));
        assert_eq!(b.get("n").unwrap().as_int().unwrap(), 1);
    }
}
