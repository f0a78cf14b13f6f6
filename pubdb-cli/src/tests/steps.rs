//! Behaviour-driven step definitions driving the CLI scenarios.

use super::helpers::{SAMPLE_DUMP, Scratch};
use super::*;
use pubdb_data::{IngestError, MaterialiseError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates CLI scenario state so each step only needs a single world
/// argument.
#[derive(Debug)]
struct CliWorld {
    scratch: Scratch,
    source: RefCell<Option<Utf8PathBuf>>,
    result: RefCell<Option<Result<IngestReport, CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            scratch: Scratch::new(),
            source: RefCell::new(None),
            result: RefCell::new(None),
        }
    }

    fn run(&self, extra: &[&str]) {
        let source = self
            .source
            .borrow()
            .clone()
            .unwrap_or_else(|| panic!("dump path must be initialised"));
        let database = self.scratch.database();
        let args = [source.as_str(), "--database", database.as_str()]
            .into_iter()
            .chain(extra.iter().copied());
        let parsed = Arguments::try_parse_from(std::iter::once("pubdb").chain(args))
            .unwrap_or_else(|err| panic!("arguments should parse: {err}"));
        *self.result.borrow_mut() = Some(run_with(parsed));
    }

    fn report(&self) -> IngestReport {
        match self.result.borrow().as_ref() {
            Some(Ok(report)) => report.clone(),
            Some(Err(err)) => panic!("expected success, got error: {err}"),
            None => panic!("pubdb was not run"),
        }
    }

    fn error(&self) -> CliError {
        match self.result.borrow_mut().take() {
            Some(Err(err)) => err,
            Some(Ok(report)) => panic!("expected failure, got {report:?}"),
            None => panic!("pubdb was not run"),
        }
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

#[given("a publication dump on disk")]
fn dump_on_disk(#[from(world)] world: &CliWorld) {
    *world.source.borrow_mut() = Some(world.scratch.write("dump.xml", SAMPLE_DUMP));
}

#[given("a publication dump with a record missing its ID")]
fn dump_missing_id(#[from(world)] world: &CliWorld) {
    let dump = "<pub><title>Anonymous</title></pub>\n<pub><ID>8</ID></pub>\n";
    *world.source.borrow_mut() = Some(world.scratch.write("dump.xml", dump));
}

#[given("no publication dump on disk")]
fn no_dump(#[from(world)] world: &CliWorld) {
    *world.source.borrow_mut() = Some(world.scratch.path("absent.xml"));
}

#[when("I run pubdb on the dump")]
fn run_default(#[from(world)] world: &CliWorld) {
    world.run(&[]);
}

#[when("I run pubdb on the dump with --skip-invalid")]
fn run_skipping(#[from(world)] world: &CliWorld) {
    world.run(&["--skip-invalid"]);
}

#[then("the run succeeds")]
fn run_succeeds(#[from(world)] world: &CliWorld) {
    let _ = world.report();
}

#[then("the database holds {publications} publications and {authors} authors")]
fn database_holds(#[from(world)] world: &CliWorld, publications: i64, authors: i64) {
    assert_eq!(world.scratch.count("Publication"), publications);
    assert_eq!(world.scratch.count("Author"), authors);
}

#[then("{count} record is reported as skipped")]
fn records_skipped(#[from(world)] world: &CliWorld, count: usize) {
    assert_eq!(world.report().skipped.len(), count);
}

#[then("the run fails with an invalid record")]
fn fails_with_invalid_record(#[from(world)] world: &CliWorld) {
    match world.error() {
        CliError::Ingest(IngestError::Materialise(MaterialiseError::InvalidRecord {
            ordinal,
            ..
        })) => assert_eq!(ordinal, 0),
        other => panic!("expected InvalidRecord, found {other:?}"),
    }
}

#[then("the run fails because the dump is missing")]
fn fails_on_missing_dump(#[from(world)] world: &CliWorld) {
    match world.error() {
        CliError::MissingSourceFile { .. } => {}
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/ingest_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(building_from_dump, "building the database from a dump");
register_cli_scenario!(skipping_missing_id, "skipping a record without an ID");
register_cli_scenario!(aborting_missing_id, "aborting on a record without an ID");
register_cli_scenario!(rejecting_missing_dump, "rejecting a missing dump");
