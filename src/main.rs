use clap::Parser;
use tradegraph::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
