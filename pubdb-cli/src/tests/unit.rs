//! Focused unit tests covering argument parsing and source validation.

use super::helpers::{SAMPLE_DUMP, Scratch};
use super::*;
use pubdb_data::{IngestError, LoadError, MaterialiseError};
use rstest::{fixture, rstest};
use std::fs;

#[fixture]
fn scratch() -> Scratch {
    Scratch::new()
}

fn parse(args: &[&str]) -> Arguments {
    Arguments::try_parse_from(std::iter::once("pubdb").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[rstest]
fn database_defaults_to_working_directory_file() {
    let options = parse(&["dump.xml"]).into_options();

    assert_eq!(options.source.as_str(), "dump.xml");
    assert_eq!(options.database.as_str(), DEFAULT_DATABASE);
    assert_eq!(options.policy, RecordPolicy::Abort);
}

#[rstest]
fn flags_override_database_and_policy() {
    let options = parse(&["dump.xml", "--database", "out/pubs.db", "--skip-invalid"]).into_options();

    assert_eq!(options.database.as_str(), "out/pubs.db");
    assert_eq!(options.policy, RecordPolicy::Skip);
}

#[rstest]
fn source_is_required() {
    let err = Arguments::try_parse_from(["pubdb"]).expect_err("missing source should fail");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[rstest]
fn missing_source_is_reported(scratch: Scratch) {
    let source = scratch.path("absent.xml");
    let args = parse(&[source.as_str()]);

    match run_with(args).expect_err("missing source should fail") {
        CliError::MissingSourceFile { path } => assert_eq!(path, source),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn directory_source_is_rejected(scratch: Scratch) {
    let source = scratch.path("dumps");
    fs::create_dir(&source).expect("create dir");
    let args = parse(&[source.as_str()]);

    match run_with(args).expect_err("directory source should fail") {
        CliError::SourcePathNotFile { path } => assert_eq!(path, source),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn builds_database_from_dump(scratch: Scratch) {
    let source = scratch.write("dump.xml", SAMPLE_DUMP);
    let database = scratch.database();
    let args = parse(&[source.as_str(), "--database", database.as_str()]);

    let report = run_with(args).expect("ingest dump");

    assert_eq!((report.publications, report.authors), (2, 2));
    assert!(!report.recoveries.is_empty());
    assert_eq!(scratch.count("Publication"), 2);
    assert_eq!(scratch.count("Author"), 2);
}

#[rstest]
fn duplicate_key_fails_without_skip_flag(scratch: Scratch) {
    let source = scratch.write("dump.xml", "<pub><ID>1</ID></pub><pub><ID>1</ID></pub>");
    let database = scratch.database();
    let args = parse(&[source.as_str(), "--database", database.as_str()]);

    match run_with(args).expect_err("duplicate key should fail") {
        CliError::Ingest(IngestError::Materialise(MaterialiseError::DuplicatePublication {
            pub_id,
            ..
        })) => assert_eq!(pub_id, 1),
        other => panic!("expected DuplicatePublication, found {other:?}"),
    }
}

#[rstest]
fn error_chain_lists_every_cause() {
    let err = CliError::Ingest(IngestError::Load(LoadError::Read {
        path: Utf8PathBuf::from("dump.xml"),
        source: std::io::Error::other("disk on fire"),
    }));

    assert_eq!(
        error_chain(&err),
        "failed to ingest publications: failed to read source file \"dump.xml\": disk on fire"
    );
}
