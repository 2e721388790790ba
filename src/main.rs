use clap::Parser;
use std::process::ExitCode;
use tidydesk::cli::{Args, run};
use tidydesk::logging;
use tidydesk::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    let guard = match logging::init(args.verbose, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            OutputFormatter::error(&format!("Failed to initialize logging: {:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "tidydesk failed");
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    };

    // Flush buffered file log lines before exit
    drop(guard);
    code
}
