//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use pubdb_cli::{CliError, error_chain, run};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match run() {
        Ok(_) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("pubdb: {}", error_chain(&err));
            std::process::exit(1);
        }
    }
}
