use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::{RunnerConfig, TranspileMode, TranspileOptions, TranspileOverrides};
use crate::engine::{
    BundleRequest, CommonOptions, Engine, EsbuildEngine, Platform, TransformRequest,
    DEFAULT_ESBUILD_BINARY,
};
use crate::errors::{Result, TranspileError};
use crate::loader::{loader_for, resolve_loaders, LoaderTable};
use crate::manifest::resolve_externals;
use crate::runtime::{HostRuntime, DEFAULT_NODE_BINARY};

/// Entry point called by the loader hook for every file it routes here
///
/// Owns the engine, the host runtime identity and the transform cache; holds
/// no other state between calls.
pub struct Transpiler {
    engine: Arc<dyn Engine>,
    cache: CacheStore,
    runtime: HostRuntime,
}

impl Transpiler {
    /// Create a transpiler with production dependencies
    ///
    /// Uses the esbuild executable, the runtime version pinned in `config`
    /// (or reported by the runtime executable), and the cache in the system
    /// temp directory.
    pub fn new(config: &RunnerConfig) -> Result<Self> {
        let runtime = match &config.node_version {
            Some(version) => HostRuntime::from_version(version),
            None => {
                HostRuntime::detect(config.node_path.as_deref().unwrap_or(DEFAULT_NODE_BINARY))?
            }
        };
        let engine = Arc::new(EsbuildEngine::new(
            config
                .esbuild_path
                .as_deref()
                .unwrap_or(DEFAULT_ESBUILD_BINARY),
        ));
        let cache = CacheStore::in_temp_dir(runtime.version())?;
        debug!(
            "Using {} targeting {}, cache at {}",
            engine.binary(),
            runtime.target(),
            cache.cache_dir().display()
        );

        Ok(Self::with_dependencies(engine, cache, runtime))
    }

    /// Create a transpiler with custom dependencies (for testing)
    pub fn with_dependencies(
        engine: Arc<dyn Engine>,
        cache: CacheStore,
        runtime: HostRuntime,
    ) -> Self {
        Self {
            engine,
            cache,
            runtime,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn runtime(&self) -> &HostRuntime {
        &self.runtime
    }

    /// Turn `code`, the contents of `file_path`, into executable code
    ///
    /// Bundle mode inlines everything reachable from the file except the
    /// project's declared dependencies and is recomputed on every call.
    /// Transform mode converts the file alone and goes through the cache.
    pub fn transpile(
        &self,
        code: &str,
        file_path: &Path,
        overrides: Option<&TranspileOverrides>,
    ) -> Result<String> {
        let options = TranspileOptions::resolve(overrides);

        let mut external: Vec<String> = resolve_externals(options.project_dir.as_deref())?
            .into_iter()
            .collect();
        external.extend(options.engine.external.iter().cloned());

        let loaders = resolve_loaders(&options.engine.loader);
        let common = options.engine.common_options(&self.runtime.target());

        debug!(
            "Transpiling {} in {} mode",
            file_path.display(),
            options.mode
        );

        match options.mode {
            TranspileMode::Bundle => {
                trace_file(&options, file_path);
                self.bundle(code, file_path, &options, loaders, external, common)
            }
            TranspileMode::Transform => self.cache.get(file_path, || {
                trace_file(&options, file_path);
                self.transform(code, file_path, &loaders, common)
            }),
        }
    }

    fn bundle(
        &self,
        code: &str,
        file_path: &Path,
        options: &TranspileOptions,
        loaders: LoaderTable,
        external: Vec<String>,
        common: CommonOptions,
    ) -> Result<String> {
        let resolve_dir = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let request = BundleRequest {
            code,
            sourcefile: file_path,
            resolve_dir,
            loader: loader_for(&loaders, file_path),
            loaders,
            external,
            platform: options.engine.platform.unwrap_or(Platform::Node),
            common,
        };

        let fragments: Vec<String> = self
            .engine
            .bundle(&request)?
            .into_iter()
            .map(|output| {
                debug!("Bundle fragment {}", output.path.display());
                output.text
            })
            .collect();

        Ok(fragments.join("\n"))
    }

    fn transform(
        &self,
        code: &str,
        file_path: &Path,
        loaders: &LoaderTable,
        common: CommonOptions,
    ) -> Result<String> {
        let request = TransformRequest {
            code,
            sourcefile: file_path,
            loader: loader_for(loaders, file_path),
            common,
        };

        self.engine
            .transform(&request)
            .map_err(TranspileError::from)
    }
}

/// Caller-requested trace of the files handed to the engine
fn trace_file(options: &TranspileOptions, file_path: &Path) {
    if options.debug {
        info!("📦 {}", file_path.display());
    }
}
