use std::process::Command;
use tracing::debug;

use crate::errors::{Result, TranspileError};

/// Default name of the host runtime executable
pub const DEFAULT_NODE_BINARY: &str = "node";

/// Identity of the host runtime that executes transpiled output
///
/// The version doubles as the cache identity and as the engine target, so
/// output cached under one Node.js version is never served to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRuntime {
    version: String,
}

impl HostRuntime {
    /// Ask the runtime executable for its version (`node --version`)
    pub fn detect(binary: &str) -> Result<Self> {
        let unavailable = |reason: String| TranspileError::RuntimeUnavailable {
            binary: binary.to_string(),
            reason,
        };

        let output = Command::new(binary)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(format!("exited with {}", output.status)));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(unavailable("empty version output".to_string()));
        }

        debug!("Detected host runtime {} ({})", version, binary);
        Ok(Self::from_version(&version))
    }

    /// Pin the runtime version, e.g. `v20.11.1` or `20.11.1`
    pub fn from_version(version: &str) -> Self {
        let version = version.trim();
        let version = if version.starts_with('v') {
            version.to_string()
        } else {
            format!("v{}", version)
        };
        Self { version }
    }

    /// Version string as reported by the runtime, with its leading `v`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Engine target for this runtime, e.g. `node20.11.1`
    pub fn target(&self) -> String {
        format!("node{}", self.version.trim_start_matches('v'))
    }
}
