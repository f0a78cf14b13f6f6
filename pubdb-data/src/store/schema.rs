#![forbid(unsafe_code)]

use rusqlite::{Error as SqliteError, Transaction};
use thiserror::Error;

/// Drop and recreate the `Publication` and `Author` tables.
///
/// Runs inside the caller's transaction so a failed rebuild leaves the
/// previous contents in place. `Author` goes first because it references
/// `Publication`.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use pubdb_data::store::reset_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// let tx = conn.transaction().expect("begin transaction");
/// reset_schema(&tx).expect("create tables");
/// tx.commit().expect("commit");
///
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
///             AND name IN ('Publication', 'Author')",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 2);
/// ```
pub fn reset_schema(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    drop_tables(transaction)?;
    create_tables(transaction)?;
    create_indexes(transaction)
}

fn drop_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_schema_step(transaction, "drop Author", "DROP TABLE IF EXISTS Author")?;
    run_schema_step(
        transaction,
        "drop Publication",
        "DROP TABLE IF EXISTS Publication",
    )
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_schema_step(
        transaction,
        "create Publication",
        "CREATE TABLE Publication (
            pub_id  INT NOT NULL UNIQUE PRIMARY KEY,
            title   VARCHAR(200),
            year    INT,
            journal VARCHAR(200),
            pages   VARCHAR(100)
        )",
    )?;
    run_schema_step(
        transaction,
        "create Author",
        "CREATE TABLE Author (
            pub_id  INT NOT NULL,
            name    VARCHAR(100) NOT NULL,
            FOREIGN KEY (pub_id) REFERENCES Publication(pub_id) ON DELETE CASCADE
        )",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_schema_step(
        transaction,
        "index Author",
        "CREATE INDEX idx_author_pub_id ON Author(pub_id)",
    )
}

fn run_schema_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError { step, source })
}

/// Error raised when a schema statement fails.
#[derive(Debug, Error)]
#[error("failed to execute schema step '{step}'")]
pub struct SchemaError {
    /// Statement that failed.
    pub step: &'static str,
    /// Source error returned by `rusqlite`.
    #[source]
    pub source: SqliteError,
}
