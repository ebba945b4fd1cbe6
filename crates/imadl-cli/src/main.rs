use imadl_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the state dir is unusable.
    let log_path = match logging::init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable: {:#}", err);
            None
        }
    };

    // Parse CLI and dispatch.
    match CliCommand::run_from_args(log_path.as_deref()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("imadl error: {:#}", err);
            std::process::exit(1);
        }
    }
}
