//! End-to-end pipeline: load a fragment dump and rebuild the store from it.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use log::{info, warn};
use thiserror::Error;

use crate::extract::extract_records;
use crate::loader::{LoadError, Recovery, load_document};
use crate::store::{
    DEFAULT_DATABASE, MaterialiseError, RecordPolicy, SkippedRecord, materialise_to_path,
};

/// Inputs for a single [`ingest`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Fragment dump to read.
    pub source: Utf8PathBuf,
    /// SQLite file to rebuild.
    pub database: Utf8PathBuf,
    /// Handling of records that cannot be stored.
    pub policy: RecordPolicy,
}

impl IngestOptions {
    /// Options that write to [`DEFAULT_DATABASE`] and abort on bad records.
    #[must_use]
    pub fn new(source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            database: Utf8PathBuf::from(DEFAULT_DATABASE),
            policy: RecordPolicy::default(),
        }
    }

    /// Write to `database` instead of the default location.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<Utf8PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    /// Use `policy` for records that cannot be stored.
    #[must_use]
    pub const fn with_policy(mut self, policy: RecordPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Outcome of a successful [`ingest`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Publication rows committed.
    pub publications: usize,
    /// Author rows committed.
    pub authors: usize,
    /// Records rolled back under [`RecordPolicy::Skip`].
    pub skipped: Vec<SkippedRecord>,
    /// Repairs made while parsing the source.
    pub recoveries: Vec<Recovery>,
}

/// Errors returned by [`ingest`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source file could not be read.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The store could not be rebuilt.
    #[error(transparent)]
    Materialise(#[from] MaterialiseError),
}

/// Load `options.source`, extract its publications and rebuild
/// `options.database` from them in one transaction.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use pubdb_data::ingest::{IngestOptions, ingest};
/// use tempfile::TempDir;
///
/// let dir = TempDir::new().expect("create temp dir");
/// let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path");
/// let source = root.join("dump.xml");
/// std::fs::write(&source, "<pub><ID>1</ID><authors><a>Ann</a></authors></pub>")
///     .expect("write dump");
///
/// let report = ingest(&IngestOptions::new(source).with_database(root.join("pubs.db")))
///     .expect("ingest dump");
/// assert_eq!((report.publications, report.authors), (1, 1));
/// ```
pub fn ingest(options: &IngestOptions) -> Result<IngestReport, IngestError> {
    info!("loading publications from {}", options.source);
    let document = load_document(&options.source)?;
    for recovery in document.recoveries() {
        warn!("{}: {recovery}", options.source);
    }
    info!(
        "found {} publication elements ({} recoveries)",
        document.publications().count(),
        document.recoveries().len()
    );

    info!("rebuilding {}", options.database);
    let report = materialise_to_path(
        &options.database,
        extract_records(&document),
        options.policy,
    )?;

    Ok(IngestReport {
        publications: report.publications,
        authors: report.authors,
        skipped: report.skipped,
        recoveries: document.recoveries().to_vec(),
    })
}
