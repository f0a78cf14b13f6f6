#![forbid(unsafe_code)]

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use pubdb_core::{PubId, PublicationRecord, RecordError};
use rusqlite::{Connection, Error as SqliteError, ErrorCode, Transaction, ffi};
use thiserror::Error;

use super::schema::{SchemaError, reset_schema};

/// What to do with a record that cannot be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Fail the whole run; nothing is committed.
    #[default]
    Abort,
    /// Roll back the offending record only and continue with the batch.
    Skip,
}

/// Why a record was left out under [`RecordPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The element could not be turned into a record.
    Invalid(RecordError),
    /// Another record with the same key was stored earlier in the run.
    DuplicatePublication,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(error) => write!(f, "{error}"),
            Self::DuplicatePublication => {
                f.write_str("a publication with the same ID was stored earlier")
            }
        }
    }
}

/// A record that was rolled back instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Zero-based position of the `pub` element in document order.
    pub ordinal: usize,
    /// Key of the record, when one could be parsed.
    pub pub_id: Option<PubId>,
    /// Cause of the skip.
    pub reason: SkipReason,
}

/// Row counts written by a successful materialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialiseReport {
    /// Publication rows committed.
    pub publications: usize,
    /// Author rows committed.
    pub authors: usize,
    /// Records rolled back under [`RecordPolicy::Skip`].
    pub skipped: Vec<SkippedRecord>,
}

/// Errors raised while rebuilding the store.
#[derive(Debug, Error)]
pub enum MaterialiseError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Dropping or recreating the tables failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A `pub` element could not be turned into a record.
    #[error("publication #{ordinal} cannot be stored")]
    InvalidRecord {
        /// Zero-based position of the element in document order.
        ordinal: usize,
        /// Extraction failure.
        #[source]
        source: RecordError,
    },
    /// Two records share a primary key.
    #[error("publication {pub_id} appears more than once")]
    DuplicatePublication {
        /// Repeated key.
        pub_id: PubId,
        /// Constraint violation reported by SQLite.
        #[source]
        source: SqliteError,
    },
    /// Writing a publication or one of its authors failed.
    #[error("failed to {operation} for publication {pub_id}")]
    PersistRow {
        /// Statement being executed.
        operation: &'static str,
        /// Key of the record being written.
        pub_id: PubId,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A transaction-level statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Statement being executed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Rebuild the store from `records` inside a single transaction.
///
/// Foreign keys are enabled, both tables are dropped and recreated, and each
/// record is inserted under its own savepoint. Under [`RecordPolicy::Abort`]
/// the first failure rolls everything back, including the schema reset.
///
/// # Examples
/// ```
/// use pubdb_core::{Publication, PublicationRecord};
/// use pubdb_data::store::{RecordPolicy, list_authors, materialise};
/// use rusqlite::Connection;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// let record = PublicationRecord::new(Publication::new(1), vec!["Alice".into()]);
///
/// let report = materialise(&mut conn, [Ok(record)], RecordPolicy::Abort)
///     .expect("materialise records");
/// assert_eq!(report.publications, 1);
/// assert_eq!(list_authors(&conn, 1).expect("list authors"), vec!["Alice"]);
/// ```
pub fn materialise<I>(
    connection: &mut Connection,
    records: I,
    policy: RecordPolicy,
) -> Result<MaterialiseReport, MaterialiseError>
where
    I: IntoIterator<Item = Result<PublicationRecord, RecordError>>,
{
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| MaterialiseError::ForeignKeys { source })?;

    let mut transaction = connection
        .transaction()
        .map_err(|source| MaterialiseError::Sqlite {
            operation: "begin materialisation transaction",
            source,
        })?;
    reset_schema(&transaction)?;

    let mut report = MaterialiseReport::default();
    for (ordinal, outcome) in records.into_iter().enumerate() {
        match store_outcome(&mut transaction, outcome) {
            Ok(authors) => {
                report.publications += 1;
                report.authors += authors;
            }
            Err(failure) => {
                let skipped = failure.resolve(ordinal, policy)?;
                warn!(
                    "skipped publication #{ordinal} ({}): {}",
                    skipped
                        .pub_id
                        .map_or_else(|| "no ID".to_owned(), |pub_id| pub_id.to_string()),
                    skipped.reason
                );
                report.skipped.push(skipped);
            }
        }
    }

    transaction
        .commit()
        .map_err(|source| MaterialiseError::Sqlite {
            operation: "commit materialisation transaction",
            source,
        })?;
    info!(
        "committed {} publications and {} authors ({} skipped)",
        report.publications,
        report.authors,
        report.skipped.len()
    );
    Ok(report)
}

/// Open (or create) the database at `path`, rebuild it from `records`, and
/// close it again.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use pubdb_core::{Publication, PublicationRecord};
/// use pubdb_data::store::{RecordPolicy, materialise_to_path};
/// use rusqlite::Connection;
/// use tempfile::TempDir;
///
/// let dir = TempDir::new().expect("create temp dir");
/// let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/database.db"))
///     .expect("utf-8 path");
/// let records = [Ok(PublicationRecord::new(Publication::new(4), Vec::new()))];
///
/// materialise_to_path(&path, records, RecordPolicy::Abort).expect("materialise to disk");
/// let conn = Connection::open(path.as_std_path()).expect("reopen database");
/// let count: i64 = conn
///     .query_row("SELECT COUNT(*) FROM Publication", [], |row| row.get(0))
///     .expect("count publications");
/// assert_eq!(count, 1);
/// ```
pub fn materialise_to_path<I>(
    path: &Utf8Path,
    records: I,
    policy: RecordPolicy,
) -> Result<MaterialiseReport, MaterialiseError>
where
    I: IntoIterator<Item = Result<PublicationRecord, RecordError>>,
{
    pubdb_fs::ensure_parent_dir(path).map_err(|source| MaterialiseError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| MaterialiseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let report = materialise(&mut connection, records, policy)?;
    connection
        .close()
        .map_err(|(_, source)| MaterialiseError::Sqlite {
            operation: "close database",
            source,
        })?;
    Ok(report)
}

/// Failure while storing one record, before the policy is applied.
enum RecordFailure {
    Invalid(RecordError),
    Duplicate { pub_id: PubId, source: SqliteError },
    Store(MaterialiseError),
}

impl RecordFailure {
    fn resolve(
        self,
        ordinal: usize,
        policy: RecordPolicy,
    ) -> Result<SkippedRecord, MaterialiseError> {
        match (self, policy) {
            (Self::Store(error), _) => Err(error),
            (Self::Invalid(source), RecordPolicy::Abort) => {
                Err(MaterialiseError::InvalidRecord { ordinal, source })
            }
            (Self::Duplicate { pub_id, source }, RecordPolicy::Abort) => {
                Err(MaterialiseError::DuplicatePublication { pub_id, source })
            }
            (Self::Invalid(error), RecordPolicy::Skip) => Ok(SkippedRecord {
                ordinal,
                pub_id: match error {
                    RecordError::MissingAuthorName { pub_id, .. } => Some(pub_id),
                    RecordError::MissingId | RecordError::InvalidId { .. } => None,
                },
                reason: SkipReason::Invalid(error),
            }),
            (Self::Duplicate { pub_id, .. }, RecordPolicy::Skip) => Ok(SkippedRecord {
                ordinal,
                pub_id: Some(pub_id),
                reason: SkipReason::DuplicatePublication,
            }),
        }
    }
}

fn store_outcome(
    transaction: &mut Transaction<'_>,
    outcome: Result<PublicationRecord, RecordError>,
) -> Result<usize, RecordFailure> {
    let record = outcome.map_err(RecordFailure::Invalid)?;
    let pub_id = record.pub_id();
    let savepoint = transaction
        .savepoint()
        .map_err(row_failure("open savepoint", pub_id))?;
    // Dropping the savepoint on an early return rolls the record back.
    let authors = insert_record(&savepoint, &record)?;
    savepoint
        .commit()
        .map_err(row_failure("release savepoint", pub_id))?;
    debug!("stored publication {pub_id} with {authors} authors");
    Ok(authors)
}

fn insert_record(
    connection: &Connection,
    record: &PublicationRecord,
) -> Result<usize, RecordFailure> {
    let publication = &record.publication;
    let pub_id = publication.pub_id;

    let mut insert_publication = connection
        .prepare_cached(
            "INSERT INTO Publication (pub_id, title, year, journal, pages)
                VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(row_failure("prepare publication insert", pub_id))?;
    insert_publication
        .execute((
            pub_id,
            publication.title.as_deref(),
            publication.year.as_deref(),
            publication.journal.as_deref(),
            publication.pages.as_deref(),
        ))
        .map_err(|source| {
            if is_duplicate_key(&source) {
                RecordFailure::Duplicate { pub_id, source }
            } else {
                row_failure("insert publication", pub_id)(source)
            }
        })?;

    let mut insert_author = connection
        .prepare_cached("INSERT INTO Author (pub_id, name) VALUES (?1, ?2)")
        .map_err(row_failure("prepare author insert", pub_id))?;
    let mut inserted = 0;
    for author in record.authors() {
        insert_author
            .execute((author.pub_id, author.name.as_str()))
            .map_err(row_failure("insert author", pub_id))?;
        inserted += 1;
    }
    Ok(inserted)
}

fn row_failure(
    operation: &'static str,
    pub_id: PubId,
) -> impl FnOnce(SqliteError) -> RecordFailure {
    move |source| {
        RecordFailure::Store(MaterialiseError::PersistRow {
            operation,
            pub_id,
            source,
        })
    }
}

fn is_duplicate_key(error: &SqliteError) -> bool {
    matches!(
        error,
        SqliteError::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
    )
}
