//! Facade crate for the publication database.
//!
//! This crate re-exports the record types from `pubdb-core` together with the
//! loader, extractor and SQLite materializer from `pubdb-data`.

#![forbid(unsafe_code)]

pub use pubdb_core::{Author, PubId, Publication, PublicationRecord, RecordError, parse_pub_id};

pub use pubdb_data::{
    Element, IngestError, IngestOptions, IngestReport, LoadError, LoadedDocument,
    MaterialiseError, MaterialiseReport, Recovery, RecoveryKind, RecordPolicy, SkipReason,
    SkippedRecord, extract_record, extract_records, ingest, load_document, materialise,
    materialise_to_path, parse_fragments,
};

/// Store maintenance and lookups over a materialised database.
pub mod store {
    pub use pubdb_data::store::{
        DEFAULT_DATABASE, LookupError, SchemaError, StoreCounts, count_rows, find_publication,
        list_authors, remove_publication, reset_schema,
    };
}
