// Allow dead code for items that are part of the library API but unused by
// the binary's command paths
#![allow(dead_code)]

mod cmd;
mod dataset;
mod emitter;
mod error;
mod rows;
mod scenario;
mod schema;
mod value;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cmd::run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
