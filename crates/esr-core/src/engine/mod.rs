//! Syntax transformation and bundling capability
//!
//! The runner does not parse or print code itself. It hands source text to an
//! [`Engine`], which either transforms one file in isolation or bundles the
//! dependency graph reachable from an entry file.

mod esbuild;

pub use esbuild::{EsbuildEngine, DEFAULT_ESBUILD_BINARY};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::loader::{Loader, LoaderTable};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to start `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", .stderr.trim_end())]
    Failed {
        status: Option<i32>,
        stderr: String,
    },

    #[error("Engine produced non UTF-8 output for {}", .path.display())]
    InvalidOutput { path: PathBuf },
}

/// Module format of the generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Cjs,
    Esm,
    Iife,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Cjs => "cjs",
            Format::Esm => "esm",
            Format::Iife => "iife",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Node,
    Neutral,
    Browser,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Node => "node",
            Platform::Neutral => "neutral",
            Platform::Browser => "browser",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    #[default]
    Inline,
    None,
}

/// Options shared by transform and bundle requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonOptions {
    pub format: Format,
    pub target: Vec<String>,
    pub minify: bool,
    pub sourcemap: SourceMapMode,
    pub define: IndexMap<String, String>,
    pub jsx_factory: Option<String>,
    pub jsx_fragment: Option<String>,
}

impl CommonOptions {
    /// CommonJS output for `target`, unminified, with inline source maps
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            format: Format::Cjs,
            target: vec![target.into()],
            minify: false,
            sourcemap: SourceMapMode::Inline,
            define: IndexMap::new(),
            jsx_factory: None,
            jsx_fragment: None,
        }
    }
}

/// Transform a single file without resolving its imports
#[derive(Debug, Clone)]
pub struct TransformRequest<'a> {
    pub code: &'a str,
    pub sourcefile: &'a Path,
    pub loader: Loader,
    pub common: CommonOptions,
}

/// Bundle everything reachable from a single in-memory entry
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    pub code: &'a str,
    pub sourcefile: &'a Path,
    /// Directory relative imports of the entry resolve against
    pub resolve_dir: PathBuf,
    /// Loader for the entry itself
    pub loader: Loader,
    /// Loaders for every file pulled into the bundle
    pub loaders: LoaderTable,
    pub external: Vec<String>,
    pub platform: Platform,
    pub common: CommonOptions,
}

/// One output fragment of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub text: String,
}

/// Trait for the underlying transformation engine
/// Allows the dispatcher to be exercised with a recording engine in tests
pub trait Engine: Send + Sync {
    fn transform(&self, request: &TransformRequest<'_>) -> Result<String, EngineError>;

    fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<OutputFile>, EngineError>;
}
