use std::path::Path;

/// Compute the cache key for a resolved source path under a runtime identity
///
/// The same file yields a different key under a different runtime version,
/// since the engine target changes with it.
pub fn cache_key(resolved_path: &Path, runtime_identity: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(resolved_path.to_string_lossy().as_bytes());
    hasher.update(runtime_identity.as_bytes());
    hasher.finalize().to_hex().to_string()
}
