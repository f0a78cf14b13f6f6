//! Loading and storage for the publication database.
//!
//! Responsibilities:
//! - Parse bibliographic XML fragment dumps, recovering from broken markup.
//! - Map recovered `pub` elements onto publication records.
//! - Rebuild the SQLite store from those records in a single transaction.
//!
//! Boundaries:
//! - Record types and key parsing live in `pubdb-core`.
//! - Ambient filesystem access goes through `pubdb-fs`.
//!
//! Invariants:
//! - A run either commits every stored record or leaves the previous store
//!   untouched.
//! - No global mutable state.

pub mod extract;
pub mod ingest;
pub mod loader;
pub mod store;

pub use extract::{extract_record, extract_records};
pub use ingest::{IngestError, IngestOptions, IngestReport, ingest};
pub use loader::{
    Element, LoadError, LoadedDocument, Recovery, RecoveryKind, load_document, parse_fragments,
};
pub use store::{
    DEFAULT_DATABASE, MaterialiseError, MaterialiseReport, RecordPolicy, SkipReason,
    SkippedRecord, materialise, materialise_to_path,
};
