use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{cache_key, CacheError, Result, CACHE_DIR_NAME, ENTRY_EXTENSION};

/// The well-known cache location under the system temp directory
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

/// Remove a cache directory tree (if present) and recreate it empty
pub fn clear_cache_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(CacheError::io(dir))?;
    }
    fs::create_dir_all(dir).map_err(CacheError::io(dir))?;
    debug!("Cleared cache directory {}", dir.display());
    Ok(())
}

/// Transform-output cache backed by flat files in a single directory
///
/// The store owns the contents of `cache_dir`. There is no locking: two
/// processes sharing a directory may both regenerate the same entry.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
    runtime_identity: String,
}

impl CacheStore {
    /// Create a store rooted at `cache_dir`, creating the directory if needed
    ///
    /// # Arguments
    /// * `cache_dir` - Directory holding `<digest>.js` entries
    /// * `runtime_identity` - Host runtime version mixed into every key
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        runtime_identity: impl Into<String>,
    ) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(CacheError::io(&cache_dir))?;

        Ok(Self {
            cache_dir,
            runtime_identity: runtime_identity.into(),
        })
    }

    /// Create a store at [`default_cache_dir`]
    pub fn in_temp_dir(runtime_identity: impl Into<String>) -> Result<Self> {
        Self::new(default_cache_dir(), runtime_identity)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn runtime_identity(&self) -> &str {
        &self.runtime_identity
    }

    /// Location of the entry for `file_path`, whether or not it exists yet
    pub fn entry_path(&self, file_path: &Path) -> PathBuf {
        let key = cache_key(&resolve_path(file_path), &self.runtime_identity);
        self.cache_dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    /// Return the cached output for `file_path`, producing it if needed
    ///
    /// `produce` runs when there is no entry yet or when the entry is
    /// strictly older than the source file. Its output is written to the
    /// entry before being returned. A failing producer leaves the cache
    /// untouched.
    pub fn get<F, E>(&self, file_path: &Path, produce: F) -> std::result::Result<String, E>
    where
        F: FnOnce() -> std::result::Result<String, E>,
        E: From<CacheError>,
    {
        let entry = self.entry_path(file_path);

        if self.is_fresh(&entry, file_path)? {
            debug!("Cache hit for {}", file_path.display());
            let code = fs::read_to_string(&entry).map_err(CacheError::io(&entry))?;
            return Ok(code);
        }

        let code = produce()?;
        fs::write(&entry, &code).map_err(CacheError::io(&entry))?;
        debug!("Cached {} as {}", file_path.display(), entry.display());
        Ok(code)
    }

    /// Delete every entry
    pub fn clear(&self) -> Result<()> {
        clear_cache_dir(&self.cache_dir)
    }

    fn is_fresh(&self, entry: &Path, file_path: &Path) -> Result<bool> {
        let entry_meta = match fs::metadata(entry) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache miss for {}", file_path.display());
                return Ok(false);
            }
            Err(e) => return Err(CacheError::io(entry)(e)),
        };
        let source_meta = fs::metadata(file_path).map_err(CacheError::io(file_path))?;

        let cached_at = entry_meta.modified().map_err(CacheError::io(entry))?;
        let modified_at = source_meta.modified().map_err(CacheError::io(file_path))?;

        if cached_at < modified_at {
            debug!("Stale cache entry for {}", file_path.display());
            return Ok(false);
        }
        Ok(true)
    }
}

/// Fully resolve a path for keying, falling back to joining with the
/// working directory when the file cannot be canonicalized
fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
