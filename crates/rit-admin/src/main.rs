use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod backup;
mod cli;
mod config;
mod console;
mod deploy;
mod deps;
mod git;
mod process;
mod project;
mod prompt;
mod session;
mod status;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cmd = cli::RootCmd::parse();
    match cli::run(cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Strict command failures were already printed by the session.
            if err.downcast_ref::<process::CommandFailed>().is_none() {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
