//! Per-extension loader table
//!
//! A loader tells the engine how to parse a file's contents. The default
//! table covers plain scripts, TypeScript, JSX and JSON; callers may replace
//! the loader for any extension.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

/// Directory whose contents are never routed through the runner
pub const VENDOR_DIR_NAME: &str = "node_modules";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Js,
    Jsx,
    Ts,
    Tsx,
    Json,
    Text,
    Base64,
}

impl Loader {
    pub fn as_str(&self) -> &'static str {
        match self {
            Loader::Js => "js",
            Loader::Jsx => "jsx",
            Loader::Ts => "ts",
            Loader::Tsx => "tsx",
            Loader::Json => "json",
            Loader::Text => "text",
            Loader::Base64 => "base64",
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Loader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" => Ok(Loader::Js),
            "jsx" => Ok(Loader::Jsx),
            "ts" => Ok(Loader::Ts),
            "tsx" => Ok(Loader::Tsx),
            "json" => Ok(Loader::Json),
            "text" => Ok(Loader::Text),
            "base64" => Ok(Loader::Base64),
            _ => Err(format!(
                "Invalid loader '{}'. Supported loaders: js, jsx, ts, tsx, json, text, base64",
                s
            )),
        }
    }
}

/// Extension (with leading dot) to loader
pub type LoaderTable = IndexMap<String, Loader>;

const DEFAULT_LOADERS: &[(&str, Loader)] = &[
    (".js", Loader::Js),
    (".mjs", Loader::Js),
    (".cjs", Loader::Js),
    (".jsx", Loader::Jsx),
    (".ts", Loader::Ts),
    (".tsx", Loader::Tsx),
    (".json", Loader::Json),
];

pub fn default_loaders() -> LoaderTable {
    DEFAULT_LOADERS
        .iter()
        .map(|(ext, loader)| (ext.to_string(), *loader))
        .collect()
}

/// Default table with each override replacing the entry for its extension
pub fn resolve_loaders(overrides: &LoaderTable) -> LoaderTable {
    let mut table = default_loaders();
    for (ext, loader) in overrides {
        table.insert(ext.clone(), *loader);
    }
    table
}

/// Extension of `path` including the leading dot, e.g. `.ts`
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Loader used for `path` under `table`; the engine treats unknown
/// extensions as plain scripts
pub fn loader_for(table: &LoaderTable, path: &Path) -> Loader {
    extension_of(path)
        .and_then(|ext| table.get(&ext).copied())
        .unwrap_or(Loader::Js)
}

/// Whether the loader hook should route `path` through the runner at all
pub fn supports(path: &Path) -> bool {
    let vendored = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == VENDOR_DIR_NAME));
    if vendored {
        return false;
    }

    match extension_of(path) {
        Some(ext) => DEFAULT_LOADERS.iter().any(|(known, _)| *known == ext),
        None => false,
    }
}
