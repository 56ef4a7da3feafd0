//! CLI command definitions
//!
//! Each profile has its own zero-argument command; which tests run is
//! fixed by the command, never by flags.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the suite without the slow integration tests
    Fast,

    /// Run only the configuration tests
    Simple,

    /// Run the whole suite
    Full,

    /// List profiles and what they select
    Profiles,

    /// Run tests inside the host (internal, started by the launcher)
    #[command(hide = true)]
    Entry {
        /// Host was started isolated from other extensions
        #[arg(long)]
        disable_extensions: bool,
    },
}
