//! exttest - profile-driven test selection for extension suites
//!
//! Exits 0 when every selected test passed (or none were selected) and 1
//! on any failure.

use clap::Parser;
use commands::Commands;
use exttest::common::logging;
use exttest::{cli, commands, host};

#[derive(Parser)]
#[command(name = "exttest", about = "Run extension test profiles in an isolated host")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Entry { disable_extensions } => {
            logging::init_entry();
            host::entry::main(disable_extensions).await
        }
        command => {
            logging::init_cli();
            cli::dispatch(command).await
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
