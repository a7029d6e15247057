//! Launching Node.js with the module-loading hook
//!
//! The hook replaces Node's per-extension loaders with a synchronous call back
//! into `esr transpile`, then runs the entry file as the main module.

use esr_core::config::TranspileMode;
use esr_core::loader::default_loaders;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const ENV_BIN: &str = "ESR_BIN";
pub const ENV_EXTENSIONS: &str = "ESR_EXTENSIONS";
pub const ENV_MODE: &str = "ESR_MODE";
pub const ENV_DEBUG: &str = "ESR_DEBUG";
pub const ENV_PROJECT: &str = "ESR_PROJECT";
pub const ENV_CONFIG: &str = "ESR_CONFIG";
pub const ENV_NODE: &str = "ESR_NODE";
pub const ENV_ESBUILD: &str = "ESR_ESBUILD";
pub const ENV_NODE_VERSION: &str = "ESR_NODE_VERSION";

/// Evaluated by `node -e` ahead of the entry file
pub const HOOK_SOURCE: &str = r#"
const { execFileSync } = require("child_process");
const Module = require("module");

const esr = process.env.ESR_BIN;
const extensions = process.env.ESR_EXTENSIONS.split(",");

for (const ext of extensions) {
  const fallback = Module._extensions[ext] || Module._extensions[".js"];
  Module._extensions[ext] = function (module, filename) {
    if (filename.split(/[\\/]/).includes("node_modules")) {
      return fallback(module, filename);
    }
    const code = execFileSync(esr, ["transpile", filename], {
      encoding: "utf8",
      stdio: ["ignore", "pipe", "inherit"],
      maxBuffer: 1024 * 1024 * 1024,
    });
    module._compile(code, filename);
  };
}

Module.runMain();
"#;

/// Everything needed to start the entry file under the hook
#[derive(Debug, Clone)]
pub struct HookLaunch<'a> {
    pub node: &'a str,
    pub esr_binary: PathBuf,
    pub entry: PathBuf,
    pub script_args: &'a [OsString],
    pub mode: TranspileMode,
    pub debug: bool,
    pub node_version: &'a str,
    pub project: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub esbuild: Option<&'a str>,
}

impl HookLaunch<'_> {
    pub fn command(&self) -> Command {
        let extensions: Vec<String> = default_loaders().into_keys().collect();

        let mut command = Command::new(self.node);
        command
            .arg("-e")
            .arg(HOOK_SOURCE)
            .arg("--")
            .arg(&self.entry)
            .args(self.script_args)
            .env(ENV_BIN, &self.esr_binary)
            .env(ENV_EXTENSIONS, extensions.join(","))
            .env(ENV_MODE, self.mode.as_str())
            .env(ENV_NODE_VERSION, self.node_version);

        if self.debug {
            command.env(ENV_DEBUG, "true");
        } else {
            command.env_remove(ENV_DEBUG);
        }
        if let Some(project) = self.project {
            command.env(ENV_PROJECT, project);
        }
        if let Some(config) = self.config {
            command.env(ENV_CONFIG, config);
        }
        if let Some(esbuild) = self.esbuild {
            command.env(ENV_ESBUILD, esbuild);
        }

        command
    }
}
