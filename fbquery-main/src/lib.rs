use fbquery_compilers_firebird::CompilerSession;
use fbquery_core::err::{Context, Result};
use fbquery_logging::info;

pub mod args;
pub mod conf;

use args::Command;
use conf::*;

/// Runs the command, returning the json to print
pub fn run(command: &Command) -> Result<String> {
    let conf = load_conf(command.args())?;
    let session = CompilerSession::new(conf)?;
    info!(
        "Compiling for Firebird {}",
        session.capabilities().server_version
    );

    let output = match command {
        Command::Compile(compile) => {
            let query = load_query(&compile.query)?;
            let compiled = session.compile(&query)?;

            serde_json::to_string_pretty(&compiled)
        }
        Command::Capabilities(_) => serde_json::to_string_pretty(session.capabilities()),
    };

    output.context("Failed to serialize output")
}
