//! CLI command handling
//!
//! Loads configuration, builds the profile table and launcher, and drives
//! a run for the requested profile.

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::host::{HostSettings, Orchestrator, ProcessHost};
use crate::profile::{self, ProfileTable};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Entry { .. } => {
            // Should never happen - entry mode is handled in main
            unreachable!("Entry command should be handled in main")
        }

        Commands::Fast => run_profile(profile::FAST).await,
        Commands::Simple => run_profile(profile::SIMPLE).await,
        Commands::Full => run_profile(profile::FULL).await,

        Commands::Profiles => {
            let config = Config::load()?;
            let profiles = ProfileTable::from_config(&config)?;

            println!("Profiles:");
            for p in profiles.iter() {
                println!("  {}", p);
                println!("      root: {}", p.root.display());
            }
            println!(
                "\nHost default timeout: {}ms",
                config.host.default_timeout_ms
            );

            Ok(())
        }
    }
}

async fn run_profile(name: &str) -> Result<()> {
    let config = Config::load()?;
    let profiles = ProfileTable::from_config(&config)?;
    let launcher = ProcessHost::from_config(&config.host)?;
    let settings = HostSettings::from_config(&config)?;

    let mut orchestrator = Orchestrator::new(&profiles, &launcher, settings);
    orchestrator.run(name).await
}
