//! Command-line interface that rebuilds the publication database from an XML
//! fragment dump.
#![forbid(unsafe_code)]

use std::error::Error;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use pubdb_data::store::DEFAULT_DATABASE;
use pubdb_data::{IngestOptions, IngestReport, RecordPolicy, ingest};

mod error;

pub use error::CliError;

/// Run the pubdb CLI with the current process arguments.
pub fn run() -> Result<IngestReport, CliError> {
    let args = Arguments::try_parse().map_err(CliError::ArgumentParsing)?;
    run_with(args)
}

/// Run the pubdb CLI with already parsed arguments.
pub fn run_with(args: Arguments) -> Result<IngestReport, CliError> {
    let options = args.into_options();
    require_source_file(&options.source)?;
    let report = ingest(&options)?;
    info!(
        "{}: {} publications, {} authors, {} skipped, {} recoveries",
        options.database,
        report.publications,
        report.authors,
        report.skipped.len(),
        report.recoveries.len()
    );
    Ok(report)
}

/// Render `error` followed by each of its causes, separated by `": "`.
#[must_use]
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut cause = error.source();
    while let Some(source) = cause {
        rendered.push_str(": ");
        rendered.push_str(&source.to_string());
        cause = source.source();
    }
    rendered
}

/// Arguments accepted by the `pubdb` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pubdb",
    about = "Rebuild a SQLite publication database from an XML fragment dump",
    version
)]
pub struct Arguments {
    /// XML file containing `<pub>` fragments.
    #[arg(value_name = "SOURCE")]
    source: Utf8PathBuf,
    /// SQLite database to drop and rebuild.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DATABASE)]
    database: Utf8PathBuf,
    /// Skip records without a usable ID or with a repeated ID instead of
    /// aborting the run.
    #[arg(long)]
    skip_invalid: bool,
}

impl Arguments {
    fn into_options(self) -> IngestOptions {
        let policy = if self.skip_invalid {
            RecordPolicy::Skip
        } else {
            RecordPolicy::Abort
        };
        IngestOptions::new(self.source)
            .with_database(self.database)
            .with_policy(policy)
    }
}

fn require_source_file(path: &Utf8Path) -> Result<(), CliError> {
    match pubdb_fs::is_regular_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
