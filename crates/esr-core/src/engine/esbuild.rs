use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use super::{
    BundleRequest, CommonOptions, Engine, EngineError, OutputFile, SourceMapMode, TransformRequest,
};

pub const DEFAULT_ESBUILD_BINARY: &str = "esbuild";

/// Engine backed by the `esbuild` executable
///
/// Source text is piped through stdin and the generated code is read back
/// from stdout, so nothing is written next to the sources.
#[derive(Debug, Clone)]
pub struct EsbuildEngine {
    binary: String,
}

impl Default for EsbuildEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ESBUILD_BINARY)
    }
}

impl EsbuildEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn run(
        &self,
        args: &[String],
        code: &str,
        cwd: Option<&Path>,
        sourcefile: &Path,
    ) -> Result<String, EngineError> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let spawn_error = |source| EngineError::Spawn {
            binary: self.binary.clone(),
            source,
        };

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(spawn_error)?;

        // stdin is fed from its own thread so a large output cannot fill the
        // stdout pipe while we are still writing.
        let output = std::thread::scope(|scope| {
            if let Some(mut stdin) = child.stdin.take() {
                scope.spawn(move || {
                    // A broken pipe means esbuild exited early; its status reports why.
                    let _ = stdin.write_all(code.as_bytes());
                });
            }
            child.wait_with_output()
        })
        .map_err(spawn_error)?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| EngineError::InvalidOutput {
            path: sourcefile.to_path_buf(),
        })
    }
}

impl Engine for EsbuildEngine {
    fn transform(&self, request: &TransformRequest<'_>) -> Result<String, EngineError> {
        let args = transform_args(request);
        self.run(&args, request.code, None, request.sourcefile)
    }

    fn bundle(&self, request: &BundleRequest<'_>) -> Result<Vec<OutputFile>, EngineError> {
        let args = bundle_args(request);
        let text = self.run(
            &args,
            request.code,
            Some(&request.resolve_dir),
            request.sourcefile,
        )?;

        Ok(vec![OutputFile {
            path: request.sourcefile.with_extension("js"),
            text,
        }])
    }
}

fn common_args(common: &CommonOptions) -> Vec<String> {
    let mut args = vec![
        format!("--format={}", common.format.as_str()),
        "--log-level=error".to_string(),
    ];

    if !common.target.is_empty() {
        args.push(format!("--target={}", common.target.join(",")));
    }
    if common.minify {
        args.push("--minify".to_string());
    }
    if common.sourcemap == SourceMapMode::Inline {
        args.push("--sourcemap=inline".to_string());
    }
    for (name, value) in &common.define {
        args.push(format!("--define:{}={}", name, value));
    }
    if let Some(factory) = &common.jsx_factory {
        args.push(format!("--jsx-factory={}", factory));
    }
    if let Some(fragment) = &common.jsx_fragment {
        args.push(format!("--jsx-fragment={}", fragment));
    }

    args
}

/// Command-line arguments for a single-file transform
pub(crate) fn transform_args(request: &TransformRequest<'_>) -> Vec<String> {
    let mut args = common_args(&request.common);
    args.push(format!("--loader={}", request.loader));
    args.push(format!("--sourcefile={}", request.sourcefile.display()));
    args
}

/// Command-line arguments for bundling from stdin
pub(crate) fn bundle_args(request: &BundleRequest<'_>) -> Vec<String> {
    let mut args = vec![
        "--bundle".to_string(),
        format!("--platform={}", request.platform.as_str()),
    ];
    args.extend(common_args(&request.common));
    args.push(format!("--loader={}", request.loader));
    args.push(format!("--sourcefile={}", request.sourcefile.display()));

    for (ext, loader) in &request.loaders {
        args.push(format!("--loader:{}={}", ext, loader));
    }
    for name in &request.external {
        args.push(format!("--external:{}", name));
    }

    args
}
