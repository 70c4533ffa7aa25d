use clap::Parser;
use masweep::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
