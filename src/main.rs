//! Socket Speedtest - command line entry point

use clap::Parser;
use sockspeed::{app::App, cli::Cli, error::AppError, logging};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    logging::init();

    if let Err(e) = App::new(cli).run().await {
        eprintln!("Error: {}", e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common failure modes
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::ConfigFetch(_) | AppError::ServerListFetch(_) => {
            eprintln!();
            eprintln!("The speedtest.net directory could not be reached:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Check proxy or firewall settings");
        }
        AppError::AllProbesFailed(_) => {
            eprintln!();
            eprintln!("No test server answered the latency probe:");
            eprintln!("  - Outbound TCP to port 8080 may be blocked");
            eprintln!("  - Try a specific server with --server <id>");
            eprintln!("  - Increase --timeout");
        }
        AppError::WorkerFatal(_) | AppError::Connection(_) => {
            eprintln!();
            eprintln!("A test connection failed mid-run:");
            eprintln!("  - The selected server may be overloaded; rerun or pick another with --server <id>");
        }
        _ => {}
    }
}
