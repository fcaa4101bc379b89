use std::io::{stderr, stdout};
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use snowrun_cli::cli_args::Args;
use snowrun_cli::commands;
use snowrun_core::execution::ProcessExecutor;

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    debug!("Arguments: {args:?}");

    match commands::execute(&args, &mut ProcessExecutor, &mut stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Nothing else can be reported if stderr is gone
            let _ = commands::report_error(&e, &mut stderr());
            ExitCode::from(commands::exit_status(&e))
        }
    }
}
