//! On-disk cache for single-file transform output
//!
//! Entries are keyed by the source file's absolute path and the host runtime
//! version, and are considered fresh as long as they are not older than the
//! source file they were produced from.

mod error;
mod hash;
mod store;

pub use error::{CacheError, Result};
pub use hash::cache_key;
pub use store::{clear_cache_dir, default_cache_dir, CacheStore};

/// Name of the cache directory under the system temp directory
pub const CACHE_DIR_NAME: &str = "esbuild-runner-cache";

/// Extension of cache entry files
pub const ENTRY_EXTENSION: &str = "js";
