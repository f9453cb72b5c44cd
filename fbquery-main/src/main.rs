use std::process;

use clap::Parser;
use fbquery_logging::error;
use fbquery_main::{args::Command, run};

fn main() {
    if let Err(err) = fbquery_logging::init_logging() {
        eprintln!("{:?}", err);
    }

    match run(&Command::parse()) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            error!("{:?}", err);
            process::exit(1);
        }
    }
}
