//! Scratch files shared by the CLI unit and behaviour tests.

use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

pub(super) const SAMPLE_DUMP: &str = "<pub><ID>1</ID><title>A</title><year>2020</year>\
    <authors><author>Ann</author><author>Ben</author></authors></pub>\n\
    <pub><ID>2</ID><title>Unclosed</pub>\n";

/// Temporary directory holding a dump and the database built from it.
#[derive(Debug)]
pub(super) struct Scratch {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temp dir is not UTF-8: {}", path.display()));
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write scratch file");
        path
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.path("out/database.db")
    }

    pub(super) fn count(&self, table: &str) -> i64 {
        let connection =
            rusqlite::Connection::open(self.database().as_std_path()).expect("open database");
        connection
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows")
    }
}
