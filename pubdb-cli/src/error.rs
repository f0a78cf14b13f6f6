//! Error types emitted by the pubdb CLI.

use camino::Utf8PathBuf;
use pubdb_data::IngestError;
use thiserror::Error;

/// Errors emitted by the pubdb CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// The source path does not exist on disk.
    #[error("source path {path:?} does not exist")]
    MissingSourceFile { path: Utf8PathBuf },
    /// The source path exists but is not a file.
    #[error("source path {path:?} exists but is not a file")]
    SourcePathNotFile { path: Utf8PathBuf },
    /// The source path could not be inspected due to an IO error.
    #[error("failed to inspect source path {path:?}")]
    InspectSourcePath {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Loading or materialising failed.
    #[error("failed to ingest publications")]
    Ingest(#[from] IngestError),
}
