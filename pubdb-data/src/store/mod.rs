//! SQLite materialisation of publication records.
//!
//! Every run drops and recreates the `Publication` and `Author` tables and
//! commits once. `Author` rows reference their publication with
//! `ON DELETE CASCADE`, and foreign keys are switched on for each connection
//! this module writes through.

mod lookup;
mod persistence;
mod schema;

pub use lookup::{
    LookupError, StoreCounts, count_rows, find_publication, list_authors, remove_publication,
};
pub use persistence::{
    MaterialiseError, MaterialiseReport, RecordPolicy, SkipReason, SkippedRecord, materialise,
    materialise_to_path,
};
pub use schema::{SchemaError, reset_schema};

/// Database file written when no other location is given.
pub const DEFAULT_DATABASE: &str = "database.db";
