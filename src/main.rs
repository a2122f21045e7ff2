//! CLI entry point for building photo mosaics

use clap::Parser;
use tilemosaic::io::cli::{Cli, CommandRunner};
use tilemosaic::io::logging::init_logging;

fn main() -> tilemosaic::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let runner = CommandRunner::new(cli);
    runner.run()
}
