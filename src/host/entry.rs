//! Entry point executed inside the host
//!
//! Receives only a profile name. The selection is resolved again on this
//! side of the process boundary, the session is executed with the
//! embedded runner, and the outcome is written to the report file the
//! launcher is waiting on.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Instrument;

use crate::common::config::Config;
use crate::common::error::ReportedError;
use crate::common::{Error, Result};
use crate::profile::ProfileTable;
use crate::runner::{ProcessRunner, TestRunner};
use crate::session::{self, Verdict};

/// Hidden subcommand name the self-hosted launcher invokes
pub const ENTRY_COMMAND: &str = "entry";
/// Profile to run
pub const PROFILE_ENV: &str = "EXTTEST_PROFILE";
/// Where to write the [`EntryReport`]
pub const REPORT_ENV: &str = "EXTTEST_REPORT";
/// Absolute path of the component under test
pub const EXTENSION_PATH_ENV: &str = "EXTTEST_EXTENSION_PATH";

/// Outcome written by the entry point for the launcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

impl EntryReport {
    pub fn from_outcome(profile: &str, outcome: &Result<Verdict>) -> Self {
        match outcome {
            Ok(verdict) => Self {
                profile: profile.to_string(),
                failures: Some(verdict.failures),
                error: None,
            },
            Err(e) => Self {
                profile: profile.to_string(),
                failures: None,
                error: Some(ReportedError::from(e)),
            },
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a report; an empty or missing file means nothing was reported
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Launch(format!("Test host wrote an unreadable report: {}", e)))
    }

    /// The reported verdict, or the error the entry point failed with
    pub fn into_verdict(self) -> Result<Verdict> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        self.failures.map(Verdict::from_failures).ok_or_else(|| {
            Error::Launch(format!(
                "Report for profile '{}' carries neither a result nor an error",
                self.profile
            ))
        })
    }
}

/// Parameters handed to the entry point by the launcher
#[derive(Debug, Clone)]
pub struct EntryContext {
    pub profile: String,
    pub report: Option<PathBuf>,
    pub extension_path: Option<PathBuf>,
}

impl EntryContext {
    pub fn from_env() -> Result<Self> {
        let profile = std::env::var(PROFILE_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} is not set; the entry point must be started by a test host",
                    PROFILE_ENV
                ))
            })?;

        Ok(Self {
            profile,
            report: std::env::var_os(REPORT_ENV).map(PathBuf::from),
            extension_path: std::env::var_os(EXTENSION_PATH_ENV).map(PathBuf::from),
        })
    }
}

/// Resolve the profile, build its session and execute it
pub async fn run_entry(
    profile_name: &str,
    config: &Config,
    runner: &dyn TestRunner,
) -> Result<Verdict> {
    let profiles = ProfileTable::from_config(config)?;
    let profile = profiles.resolve(profile_name)?;
    let session = session::build(
        profile,
        Duration::from_millis(config.host.default_timeout_ms),
    )?;
    session.execute(runner).await
}

/// Body of the hidden `entry` subcommand
pub async fn main(disable_extensions: bool) -> Result<()> {
    let ctx = EntryContext::from_env()?;
    if !disable_extensions {
        tracing::warn!("Host started without extension isolation");
    }

    let outcome = execute(&ctx).await;

    if let Some(path) = &ctx.report {
        EntryReport::from_outcome(&ctx.profile, &outcome).write(path)?;
    }

    outcome?.into_result()
}

async fn execute(ctx: &EntryContext) -> Result<Verdict> {
    let mut config = Config::load()?;
    if let Some(path) = &ctx.extension_path {
        config.suite.extension_path = path.clone();
    }

    let runner = ProcessRunner::from_config(&config.runner)?;
    tracing::info!(profile = %ctx.profile, "Entry point started");
    run_entry(&ctx.profile, &config, &runner)
        .instrument(tracing::info_span!("entry", profile = %ctx.profile))
        .await
}
