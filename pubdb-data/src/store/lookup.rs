#![forbid(unsafe_code)]

use pubdb_core::{PubId, Publication};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

/// Row totals for both tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    /// Rows in `Publication`.
    pub publications: u64,
    /// Rows in `Author`.
    pub authors: u64,
}

/// Errors raised while reading or pruning a materialised store.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A query failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Statement being executed.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

fn query_failure(operation: &'static str) -> impl FnOnce(SqliteError) -> LookupError {
    move |source| LookupError::Sqlite { operation, source }
}

/// Fetch the publication stored under `pub_id`.
///
/// `year` is read back as text, whatever affinity SQLite applied on insert.
pub fn find_publication(
    connection: &Connection,
    pub_id: PubId,
) -> Result<Option<Publication>, LookupError> {
    let mut statement = connection
        .prepare_cached(
            "SELECT pub_id, title, CAST(year AS TEXT), journal, pages
                FROM Publication WHERE pub_id = ?1",
        )
        .map_err(query_failure("prepare publication lookup"))?;
    statement
        .query_row([pub_id], |row| {
            Ok(Publication {
                pub_id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                journal: row.get(3)?,
                pages: row.get(4)?,
            })
        })
        .optional()
        .map_err(query_failure("look up publication"))
}

/// Author names stored for `pub_id`, in insertion order.
///
/// Repeated names are returned once per row.
pub fn list_authors(connection: &Connection, pub_id: PubId) -> Result<Vec<String>, LookupError> {
    let mut statement = connection
        .prepare_cached("SELECT name FROM Author WHERE pub_id = ?1 ORDER BY rowid")
        .map_err(query_failure("prepare author listing"))?;
    let rows = statement
        .query_map([pub_id], |row| row.get::<_, String>(0))
        .map_err(query_failure("list authors"))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(query_failure("read author row"))
}

/// Delete a publication; its authors follow through the cascading key.
///
/// Returns `false` when nothing was stored under `pub_id`.
///
/// # Examples
/// ```
/// use pubdb_core::{Publication, PublicationRecord};
/// use pubdb_data::store::{RecordPolicy, count_rows, materialise, remove_publication};
/// use rusqlite::Connection;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// let record = PublicationRecord::new(Publication::new(7), vec!["Ann".into(), "Ben".into()]);
/// materialise(&mut conn, [Ok(record)], RecordPolicy::Abort).expect("materialise");
///
/// assert!(remove_publication(&conn, 7).expect("delete publication"));
/// let counts = count_rows(&conn).expect("count rows");
/// assert_eq!((counts.publications, counts.authors), (0, 0));
/// ```
pub fn remove_publication(connection: &Connection, pub_id: PubId) -> Result<bool, LookupError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| LookupError::ForeignKeys { source })?;
    let removed = connection
        .execute("DELETE FROM Publication WHERE pub_id = ?1", [pub_id])
        .map_err(query_failure("delete publication"))?;
    Ok(removed > 0)
}

/// Count the rows in both tables.
pub fn count_rows(connection: &Connection) -> Result<StoreCounts, LookupError> {
    let count = |operation: &'static str, sql: &str| {
        connection
            .query_row(sql, [], |row| row.get::<_, i64>(0))
            .map(|value| u64::try_from(value).unwrap_or_default())
            .map_err(query_failure(operation))
    };
    Ok(StoreCounts {
        publications: count("count publications", "SELECT COUNT(*) FROM Publication")?,
        authors: count("count authors", "SELECT COUNT(*) FROM Author")?,
    })
}
