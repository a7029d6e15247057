//! Mock implementations for testing

use esr_core::engine::{
    BundleRequest, CommonOptions, Engine, EngineError, OutputFile, Platform, TransformRequest,
};
use esr_core::loader::{Loader, LoaderTable};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What the engine was asked to transform
#[derive(Debug, Clone)]
pub struct RecordedTransform {
    pub sourcefile: PathBuf,
    pub loader: Loader,
    pub common: CommonOptions,
}

/// What the engine was asked to bundle
#[derive(Debug, Clone)]
pub struct RecordedBundle {
    pub sourcefile: PathBuf,
    pub resolve_dir: PathBuf,
    pub loader: Loader,
    pub loaders: LoaderTable,
    pub external: Vec<String>,
    pub platform: Platform,
    pub common: CommonOptions,
}

/// An engine that records every request and echoes the source back
///
/// Transform output is `// <loader>` followed by the source; bundle output is
/// one fragment per configured prefix, each followed by the source.
#[derive(Debug)]
pub struct RecordingEngine {
    transforms: Mutex<Vec<RecordedTransform>>,
    bundles: Mutex<Vec<RecordedBundle>>,
    bundle_prefixes: Vec<String>,
    failure: Option<String>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            transforms: Mutex::new(Vec::new()),
            bundles: Mutex::new(Vec::new()),
            bundle_prefixes: vec!["// bundle".to_string()],
            failure: None,
        }
    }
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Engine whose bundles come back as several output fragments
    pub fn with_bundle_fragments(prefixes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            bundle_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        })
    }

    /// Engine that rejects every request with `stderr`
    pub fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(stderr.to_string()),
            ..Self::default()
        })
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.lock().unwrap().len()
    }

    pub fn bundle_count(&self) -> usize {
        self.bundles.lock().unwrap().len()
    }

    pub fn transforms(&self) -> Vec<RecordedTransform> {
        self.transforms.lock().unwrap().clone()
    }

    pub fn bundles(&self) -> Vec<RecordedBundle> {
        self.bundles.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), EngineError> {
        match &self.failure {
            Some(stderr) => Err(EngineError::Failed {
                status: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Engine for RecordingEngine {
    fn transform(&self, request: &TransformRequest<'_>) -> Result<String, EngineError> {
        self.transforms.lock().unwrap().push(RecordedTransform {
            sourcefile: request.sourcefile.to_path_buf(),
            loader: request.loader,
            common: request.common.clone(),
        });
        self.check_failure()?;

        Ok(format!("// {}\n{}", request.loader, request.code))
    }

    fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<OutputFile>, EngineError> {
        self.bundles.lock().unwrap().push(RecordedBundle {
            sourcefile: request.sourcefile.to_path_buf(),
            resolve_dir: request.resolve_dir.clone(),
            loader: request.loader,
            loaders: request.loaders.clone(),
            external: request.external.clone(),
            platform: request.platform,
            common: request.common.clone(),
        });
        self.check_failure()?;

        Ok(self
            .bundle_prefixes
            .iter()
            .enumerate()
            .map(|(i, prefix)| OutputFile {
                path: PathBuf::from(format!("out{}.js", i)),
                text: format!("{}\n{}", prefix, request.code),
            })
            .collect())
    }
}
