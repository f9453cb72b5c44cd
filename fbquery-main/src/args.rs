use std::path::PathBuf;

use clap::Parser;

/// Compiles query trees into Firebird sql
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub enum Command {
    /// Compiles a query tree file and prints the statement and its parameters as json
    Compile(CompileArgs),
    /// Prints the sql features available on the configured server version
    Capabilities(Args),
}

#[derive(Parser, Debug)]
pub struct Args {
    /// The path of the compiler configuration file
    #[clap(short, long, value_parser)]
    pub config: Option<PathBuf>,
    /// The server version, overrides the configuration file
    #[clap(short, long, value_parser)]
    pub server_version: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// The path of the query tree, as json or yaml
    #[clap(short, long, value_parser)]
    pub query: PathBuf,
    #[clap(flatten)]
    pub args: Args,
}

impl Command {
    pub fn args(&self) -> &Args {
        match self {
            Command::Compile(compile) => &compile.args,
            Command::Capabilities(args) => args,
        }
    }
}
