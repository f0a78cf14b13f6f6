use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

/// Directory containing the fragment dump fixtures.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Temporary directory with a UTF-8 path for sources and databases.
pub struct Scratch {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("failed to create temp dir: {err}"));
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temp dir is not UTF-8: {}", path.display()));
        Self { _dir: dir, root }
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name` and return its path.
    pub fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap_or_else(|err| {
            panic!("failed to write {path}: {err}");
        });
        path
    }
}

/// Open an existing database for assertions.
pub fn open_database(path: &Utf8Path) -> Connection {
    Connection::open(path.as_std_path()).unwrap_or_else(|err| {
        panic!("failed to open database {path}: {err}");
    })
}
