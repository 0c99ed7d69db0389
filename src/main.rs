mod args;
mod client;
mod collect;
mod error;
mod models;
mod perfdata;
mod stats;
mod status;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout is reserved for the status line; logs are off unless RUST_LOG is set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = args::Args::parse();
    let now = chrono::Local::now().naive_local();

    let report = stats::run(&args, now).await;
    println!("{}", report);
    ExitCode::from(report.exit_code())
}
