//! Host process spawning
//!
//! Without a configured host executable the harness hosts itself: the
//! current binary is re-run with the hidden `entry` subcommand. Either way
//! only the profile name and a report path cross the process boundary.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::{Child, Command as TokioCommand};

use crate::common::config::HostConfig;
use crate::common::{Error, Result};
use crate::session::Verdict;

use super::entry::{EntryReport, ENTRY_COMMAND, EXTENSION_PATH_ENV, PROFILE_ENV, REPORT_ENV};
use super::{HostLauncher, LaunchRequest, RunningHost};

/// Launches the host as a child process
#[derive(Debug, Clone, Default)]
pub struct ProcessHost {
    executable: Option<PathBuf>,
    args: Vec<String>,
}

impl ProcessHost {
    /// Host the entry point in this executable
    pub fn self_hosted() -> Self {
        Self::default()
    }

    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let executable = config
            .executable
            .as_ref()
            .map(|exe| {
                which::which(exe).map_err(|e| {
                    Error::Launch(format!("Host executable '{}' not found: {}", exe.display(), e))
                })
            })
            .transpose()?;

        Ok(Self {
            executable,
            args: config.args.clone(),
        })
    }

    fn command(&self, request: &LaunchRequest) -> TokioCommand {
        match &self.executable {
            Some(exe) => {
                let mut cmd = TokioCommand::new(exe);
                cmd.args(&self.args)
                    .arg(format!(
                        "--extensionDevelopmentPath={}",
                        request.extension_development_path.display()
                    ))
                    .arg(format!(
                        "--extensionTestsPath={}",
                        request.extension_tests_path.display()
                    ));
                cmd
            }
            None => {
                let mut cmd = TokioCommand::new(&request.extension_tests_path);
                cmd.arg(ENTRY_COMMAND);
                cmd
            }
        }
    }
}

#[async_trait]
impl HostLauncher for ProcessHost {
    async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn RunningHost>> {
        let report = tempfile::Builder::new()
            .prefix("exttest-report-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| Error::Launch(format!("Failed to create report file: {}", e)))?;

        let mut cmd = self.command(request);
        cmd.args(&request.launch_args)
            .env(PROFILE_ENV, &request.profile)
            .env(REPORT_ENV, report.path())
            .env(EXTENSION_PATH_ENV, &request.extension_development_path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        tracing::debug!(command = ?cmd.as_std(), "Spawning test host");

        let child = cmd
            .spawn()
            .map_err(|e| Error::Launch(format!("Failed to spawn test host: {}", e)))?;

        Ok(Box::new(HostProcess { child, report }))
    }
}

/// A running host child and the file its entry point reports into
struct HostProcess {
    child: Child,
    report: NamedTempFile,
}

#[async_trait]
impl RunningHost for HostProcess {
    async fn wait(self: Box<Self>) -> Result<Verdict> {
        let HostProcess { mut child, report } = *self;
        let status = child
            .wait()
            .await
            .map_err(|e| Error::Launch(format!("Failed to wait for test host: {}", e)))?;

        tracing::debug!(%status, "Test host exited");

        match EntryReport::read(report.path())? {
            Some(report) => report.into_verdict(),
            None => Err(Error::Launch(format!(
                "Test host exited ({}) before reporting a result",
                status
            ))),
        }
    }
}
