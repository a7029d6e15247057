use clap::{Args, CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use esr_core::cache::{clear_cache_dir, default_cache_dir};
use esr_core::config::{CliOverrides, RunnerConfig, TranspileMode, TranspileOverrides};
use esr_core::loader::supports;
use esr_core::runtime::{HostRuntime, DEFAULT_NODE_BINARY};
use esr_core::Transpiler;

mod hook;

use hook::{
    HookLaunch, ENV_CONFIG, ENV_DEBUG, ENV_ESBUILD, ENV_MODE, ENV_NODE, ENV_NODE_VERSION,
    ENV_PROJECT,
};

/// esr - run TypeScript and JSX files on Node.js without a build step
#[derive(Parser, Debug)]
#[command(name = "esr")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transpile one file and print the result (called by the loader hook)
    Transpile {
        /// Transpilation mode (bundle, transform)
        #[arg(long, value_name = "MODE", env = ENV_MODE)]
        mode: Option<String>,

        /// Log each file handed to the engine
        #[arg(long, env = ENV_DEBUG)]
        debug: bool,

        #[command(flatten)]
        runner: RunnerArgs,

        /// Source file to transpile
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the transform cache directory
    CacheDir,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Transform on a file per file basis and cache code
    #[arg(long)]
    cache: bool,

    /// Clear transform cache
    #[arg(long, alias = "clearCache")]
    clear_cache: bool,

    /// Log each file handed to the engine
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    runner: RunnerArgs,

    /// Source file to run, followed by the arguments passed to it
    ///
    /// Everything after the file belongs to the script, flags included.
    #[arg(
        value_name = "FILE",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command_line: Vec<OsString>,
}

#[derive(Args, Debug, Clone, Default)]
struct RunnerArgs {
    /// Directory containing package.json (default: current directory)
    #[arg(long, value_name = "DIR", env = ENV_PROJECT)]
    project: Option<PathBuf>,

    /// Path to esr.config.yaml
    #[arg(long, value_name = "FILE", env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Node.js executable
    #[arg(long, value_name = "PATH", env = ENV_NODE)]
    node: Option<String>,

    /// esbuild executable
    #[arg(long, value_name = "PATH", env = ENV_ESBUILD)]
    esbuild: Option<String>,

    /// Node.js version to target instead of asking the executable
    #[arg(long, value_name = "VERSION", env = ENV_NODE_VERSION)]
    node_version: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug = match &cli.command {
        Some(Command::Transpile { debug, .. }) => *debug,
        _ => cli.run.debug,
    };
    init_tracing(debug);

    match cli.command {
        Some(Command::Transpile {
            mode,
            debug,
            runner,
            file,
        }) => transpile_file(mode.as_deref(), debug, &runner, &file),
        Some(Command::CacheDir) => {
            println!("{}", default_cache_dir().display());
            Ok(())
        }
        None => run(cli.run),
    }
}

/// Logs go to stderr; stdout carries transpiled code for the hook
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

/// Layer command-line settings over the project's config file
fn load_config(
    runner: &RunnerArgs,
    transpile: TranspileOverrides,
) -> anyhow::Result<RunnerConfig> {
    let mut config = if let Some(ref path) = runner.config {
        RunnerConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {}", e))?
    } else {
        let dir = match runner.project {
            Some(ref dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        RunnerConfig::discover(&dir)?.unwrap_or_default()
    };

    let overrides = CliOverrides {
        transpile: TranspileOverrides {
            project_dir: runner.project.clone(),
            ..transpile
        },
        node_path: runner.node.clone(),
        esbuild_path: runner.esbuild.clone(),
        node_version: runner.node_version.clone(),
    };
    config.merge(&overrides);

    Ok(config)
}

/// Run a script under the loader hook and exit with its status
fn run(args: RunArgs) -> anyhow::Result<()> {
    if args.clear_cache {
        let dir = default_cache_dir();
        clear_cache_dir(&dir)?;
        println!("Cleared {}", dir.display());
        return Ok(());
    }

    let mut command_line = args.command_line.into_iter();
    let entry = match command_line.next().map(PathBuf::from) {
        Some(file) if file.exists() => file.canonicalize()?,
        _ => {
            Cli::command().print_help()?;
            std::process::exit(1);
        }
    };
    let script_args: Vec<OsString> = command_line.collect();

    let transpile = TranspileOverrides {
        mode: args.cache.then_some(TranspileMode::Transform),
        debug: args.debug.then_some(true),
        ..Default::default()
    };
    let config = load_config(&args.runner, transpile)?;

    let node = config.node_path.as_deref().unwrap_or(DEFAULT_NODE_BINARY);
    let runtime = match config.node_version {
        Some(ref version) => HostRuntime::from_version(version),
        None => HostRuntime::detect(node)?,
    };

    let launch = HookLaunch {
        node,
        esr_binary: std::env::current_exe()?,
        entry,
        script_args: &script_args,
        mode: config.transpile.mode.unwrap_or_default(),
        debug: config.transpile.debug.unwrap_or(false),
        node_version: runtime.version(),
        project: config.transpile.project_dir.as_deref(),
        config: args.runner.config.as_deref(),
        esbuild: config.esbuild_path.as_deref(),
    };

    debug!(
        "Running {} with {} in {} mode",
        launch.entry.display(),
        runtime.version(),
        launch.mode
    );

    let status = launch
        .command()
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to start `{}`: {}", node, e))?;

    std::process::exit(status.code().unwrap_or(1));
}

/// Print the transpiled form of `file` on stdout
fn transpile_file(
    mode: Option<&str>,
    debug: bool,
    runner: &RunnerArgs,
    file: &Path,
) -> anyhow::Result<()> {
    let mode = mode.map(str::parse::<TranspileMode>).transpose()?;
    let code = std::fs::read_to_string(file)?;

    let mut stdout = std::io::stdout().lock();

    if !supports(file) {
        stdout.write_all(code.as_bytes())?;
        return Ok(());
    }

    let transpile = TranspileOverrides {
        mode,
        debug: debug.then_some(true),
        ..Default::default()
    };
    let config = load_config(runner, transpile)?;
    let transpiler = Transpiler::new(&config)?;

    let output = transpiler.transpile(&code, file, Some(&config.transpile))?;
    stdout.write_all(output.as_bytes())?;
    Ok(())
}
