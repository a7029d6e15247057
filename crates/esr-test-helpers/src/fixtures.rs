//! Test fixtures - temporary projects and source snippets

use esr_core::cache::CacheStore;
use esr_core::engine::Engine;
use esr_core::manifest::MANIFEST_FILE_NAME;
use esr_core::runtime::HostRuntime;
use esr_core::Transpiler;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Runtime version used by fixture transpilers
pub const FIXTURE_NODE_VERSION: &str = "v20.11.1";

/// A throwaway project directory with its own cache directory
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Project with a `package.json` holding `manifest`
    pub fn with_manifest(manifest: &str) -> Self {
        let fixture = Self::new();
        fixture.write(MANIFEST_FILE_NAME, manifest);
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Cache directory private to this fixture, outside the project sources
    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join(".cache")
    }

    /// Write a project file, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn cache_store(&self) -> CacheStore {
        CacheStore::new(self.cache_dir(), FIXTURE_NODE_VERSION).unwrap()
    }

    /// Transpiler using `engine` and this fixture's cache directory
    pub fn transpiler(&self, engine: Arc<dyn Engine>) -> Transpiler {
        Transpiler::with_dependencies(
            engine,
            self.cache_store(),
            HostRuntime::from_version(FIXTURE_NODE_VERSION),
        )
    }

    /// Number of entries currently in the cache directory
    pub fn cache_entry_count(&self) -> usize {
        match fs::read_dir(self.cache_dir()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Move a file's modification time `secs` seconds into the future
pub fn touch_forward(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() + Duration::from_secs(secs));
}

pub fn typescript_module() -> &'static str {
    r#"export function add(a: number, b: number): number {
    return a + b
}"#
}

pub fn typescript_entry() -> &'static str {
    r#"import { add } from "./math"
import leftPad from "left-pad"

console.log(leftPad(String(add(1, 2)), 4))"#
}

pub fn tsx_component() -> &'static str {
    r#"export const Greeting = ({ name }: { name: string }) => <p>Hello {name}</p>"#
}
