use clap::Parser;
use plotscript::cli::{Cli, run};
use plotscript::logging::init_logging;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
