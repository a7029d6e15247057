use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::{CommonOptions, Format, Platform, SourceMapMode};
use crate::errors::{ConfigError, Result};
use crate::loader::LoaderTable;

/// Project configuration file name, looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "esr.config.yaml";

/// How a file is turned into executable code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranspileMode {
    /// Inline the whole dependency graph into one output, every time
    #[default]
    Bundle,
    /// Convert one file's syntax and cache the result
    Transform,
}

impl TranspileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranspileMode::Bundle => "bundle",
            TranspileMode::Transform => "transform",
        }
    }
}

impl fmt::Display for TranspileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranspileMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bundle" => Ok(TranspileMode::Bundle),
            "transform" => Ok(TranspileMode::Transform),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Caller-supplied engine configuration
///
/// Unset fields fall back to the common options derived from the host
/// runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOverrides {
    /// Loader per extension, replacing the default for that extension
    #[serde(default)]
    pub loader: LoaderTable,

    /// Module names kept external in addition to the manifest's dependencies
    #[serde(default)]
    pub external: Vec<String>,

    #[serde(default)]
    pub format: Option<Format>,

    #[serde(default)]
    pub target: Option<Vec<String>>,

    #[serde(default)]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub minify: Option<bool>,

    #[serde(default)]
    pub sourcemap: Option<SourceMapMode>,

    #[serde(default)]
    pub define: IndexMap<String, String>,

    #[serde(default)]
    pub jsx_factory: Option<String>,

    #[serde(default)]
    pub jsx_fragment: Option<String>,
}

impl EngineOverrides {
    /// Layer `other` on top of `self`
    pub fn merge(&mut self, other: &EngineOverrides) {
        for (ext, loader) in &other.loader {
            self.loader.insert(ext.clone(), *loader);
        }
        self.external.extend(other.external.iter().cloned());
        for (name, value) in &other.define {
            self.define.insert(name.clone(), value.clone());
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.target.is_some() {
            self.target = other.target.clone();
        }
        if other.platform.is_some() {
            self.platform = other.platform;
        }
        if other.minify.is_some() {
            self.minify = other.minify;
        }
        if other.sourcemap.is_some() {
            self.sourcemap = other.sourcemap;
        }
        if other.jsx_factory.is_some() {
            self.jsx_factory = other.jsx_factory.clone();
        }
        if other.jsx_fragment.is_some() {
            self.jsx_fragment = other.jsx_fragment.clone();
        }
    }

    /// Common engine options for `runtime_target` with these overrides applied
    pub fn common_options(&self, runtime_target: &str) -> CommonOptions {
        let mut common = CommonOptions::for_target(runtime_target);
        if let Some(format) = self.format {
            common.format = format;
        }
        if let Some(target) = &self.target {
            common.target = target.clone();
        }
        if let Some(minify) = self.minify {
            common.minify = minify;
        }
        if let Some(sourcemap) = self.sourcemap {
            common.sourcemap = sourcemap;
        }
        common.define = self.define.clone();
        common.jsx_factory = self.jsx_factory.clone();
        common.jsx_fragment = self.jsx_fragment.clone();
        common
    }
}

/// Partial transpile options supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspileOverrides {
    #[serde(default)]
    pub mode: Option<TranspileMode>,

    #[serde(default)]
    pub debug: Option<bool>,

    /// Directory holding the project manifest; defaults to the working directory
    #[serde(default)]
    pub project_dir: Option<PathBuf>,

    #[serde(default)]
    pub engine: EngineOverrides,
}

impl TranspileOverrides {
    /// Layer `other` on top of `self`
    pub fn merge(&mut self, other: &TranspileOverrides) {
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.debug.is_some() {
            self.debug = other.debug;
        }
        if other.project_dir.is_some() {
            self.project_dir = other.project_dir.clone();
        }
        self.engine.merge(&other.engine);
    }
}

/// Fully resolved options for a single transpile call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    pub mode: TranspileMode,
    pub debug: bool,
    pub project_dir: Option<PathBuf>,
    pub engine: EngineOverrides,
}

impl TranspileOptions {
    /// Defaults (`bundle`, no debug trace) with `overrides` applied
    pub fn resolve(overrides: Option<&TranspileOverrides>) -> Self {
        let mut options = Self::default();
        if let Some(overrides) = overrides {
            if let Some(mode) = overrides.mode {
                options.mode = mode;
            }
            if let Some(debug) = overrides.debug {
                options.debug = debug;
            }
            options.project_dir = overrides.project_dir.clone();
            options.engine = overrides.engine.clone();
        }
        options
    }
}

/// Runner configuration, usually read from `esr.config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    #[serde(flatten)]
    pub transpile: TranspileOverrides,

    /// Host runtime executable (default: `node`)
    #[serde(default)]
    pub node_path: Option<String>,

    /// Engine executable (default: `esbuild`)
    #[serde(default)]
    pub esbuild_path: Option<String>,

    /// Pinned runtime version; skips asking the runtime for it
    #[serde(default)]
    pub node_version: Option<String>,
}

/// Settings given on the command line, layered over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub transpile: TranspileOverrides,
    pub node_path: Option<String>,
    pub esbuild_path: Option<String>,
    pub node_version: Option<String>,
}

impl RunnerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunnerConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidConfigFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Load `esr.config.yaml` from `dir` if there is one
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Merge CLI overrides into this configuration
    pub fn merge(&mut self, cli: &CliOverrides) {
        self.transpile.merge(&cli.transpile);
        if cli.node_path.is_some() {
            self.node_path = cli.node_path.clone();
        }
        if cli.esbuild_path.is_some() {
            self.esbuild_path = cli.esbuild_path.clone();
        }
        if cli.node_version.is_some() {
            self.node_version = cli.node_version.clone();
        }
    }
}
