//! Run TypeScript and JSX sources on Node.js without a build step
//!
//! The core decides, per file, whether to bundle the file's whole dependency
//! graph or to transform the file on its own, and keeps transformed output in
//! an on-disk cache so repeated runs stay cheap.

pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod manifest;
pub mod runtime;
pub mod transpile;

pub use cache::CacheStore;
pub use config::{
    CliOverrides, EngineOverrides, RunnerConfig, TranspileMode, TranspileOptions,
    TranspileOverrides,
};
pub use engine::{Engine, EngineError, EsbuildEngine};
pub use errors::{ConfigError, TranspileError};
pub use loader::{default_loaders, resolve_loaders, supports, Loader, LoaderTable};
pub use manifest::{resolve_externals, ExternalModuleSet};
pub use runtime::HostRuntime;
pub use transpile::Transpiler;
