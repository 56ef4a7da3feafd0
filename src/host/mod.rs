//! Isolated host launching and verdict reduction
//!
//! The outer process resolves the profile and builds the session to fail
//! fast, then hands the profile name to an isolated host. The host runs
//! the entry point, which re-resolves the selection on its side and
//! reports a verdict back.
//!
//! Precondition: a host environment serves one run at a time. Nothing
//! here locks it; concurrent invocations sharing one host are unsupported.

pub mod entry;
mod launcher;

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::profile::ProfileTable;
use crate::session::{self, Verdict};

pub use launcher::ProcessHost;

/// Launch argument isolating the host from other installed extensions
pub const DISABLE_EXTENSIONS_ARG: &str = "--disable-extensions";

/// What the host needs to load the component and find the entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Profile the entry point re-resolves inside the host
    pub profile: String,
    /// Component under test
    pub extension_development_path: PathBuf,
    /// Entry point executed inside the host
    pub extension_tests_path: PathBuf,
    pub launch_args: Vec<String>,
}

/// Starts an isolated host for one run
#[async_trait]
pub trait HostLauncher: Send + Sync {
    /// Provision and start the host; returns once it is running
    async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn RunningHost>>;
}

/// A started host
#[async_trait]
pub trait RunningHost: Send {
    /// Wait for the entry point to finish and collect its verdict
    async fn wait(self: Box<Self>) -> Result<Verdict>;
}

/// Host-side settings shared by every run
#[derive(Debug, Clone)]
pub struct HostSettings {
    pub extension_path: PathBuf,
    pub entry_path: PathBuf,
    pub launch_args: Vec<String>,
    /// Timeout for profiles without their own
    pub default_timeout: Duration,
}

impl HostSettings {
    /// Settings for hosting this executable's entry point
    pub fn from_config(config: &Config) -> Result<Self> {
        let entry_path = std::env::current_exe().map_err(|e| {
            Error::Internal(format!("Failed to get current executable path: {}", e))
        })?;

        Ok(Self {
            extension_path: config.suite.extension_dir()?,
            entry_path,
            launch_args: vec![DISABLE_EXTENSIONS_ARG.to_string()],
            default_timeout: Duration::from_millis(config.host.default_timeout_ms),
        })
    }

    fn request(&self, profile: &str) -> LaunchRequest {
        LaunchRequest {
            profile: profile.to_string(),
            extension_development_path: self.extension_path.clone(),
            extension_tests_path: self.entry_path.clone(),
            launch_args: self.launch_args.clone(),
        }
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Launching,
    Running,
    Succeeded,
    Failed(String),
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "not started"),
            RunState::Launching => write!(f, "launching"),
            RunState::Running => write!(f, "running"),
            RunState::Succeeded => write!(f, "succeeded"),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Drives one run from profile name to verdict
///
/// Single use: a finished run, successful or not, is never retried.
pub struct Orchestrator<'a> {
    profiles: &'a ProfileTable,
    launcher: &'a dyn HostLauncher,
    settings: HostSettings,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        profiles: &'a ProfileTable,
        launcher: &'a dyn HostLauncher,
        settings: HostSettings,
    ) -> Self {
        Self {
            profiles,
            launcher,
            settings,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run a profile: `Ok(())` when every test passed
    pub async fn run(&mut self, profile_name: &str) -> Result<()> {
        if self.state != RunState::NotStarted {
            return Err(Error::Internal(format!(
                "Run already attempted (state: {})",
                self.state
            )));
        }

        let result = self.run_stages(profile_name).await;
        self.transition(match &result {
            Ok(()) => RunState::Succeeded,
            Err(e) => RunState::Failed(e.to_string()),
        });
        result
    }

    async fn run_stages(&mut self, profile_name: &str) -> Result<()> {
        let profiles = self.profiles;
        let profile = profiles.resolve(profile_name)?;

        // Resolve here too so bad roots and patterns fail before a host is provisioned
        let session = session::build(profile, self.settings.default_timeout)?;
        tracing::info!(
            profile = %profile,
            files = session.files().len(),
            "Selected test files"
        );

        self.transition(RunState::Launching);
        let request = self.settings.request(&profile.name);
        let host = self.launcher.launch(&request).await?;

        self.transition(RunState::Running);
        let verdict = host.wait().await?;

        tracing::info!(failures = verdict.failures, "Host finished");
        verdict.into_result()
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Run state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FAST, FULL, SIMPLE};
    use std::path::Path;
    use std::sync::Mutex;

    /// Launcher returning a canned outcome and recording requests
    struct FakeLauncher {
        launch_error: Option<String>,
        failures: usize,
        requests: Mutex<Vec<LaunchRequest>>,
    }

    impl FakeLauncher {
        fn reporting(failures: usize) -> Self {
            Self {
                launch_error: None,
                failures,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn broken(reason: &str) -> Self {
            Self {
                launch_error: Some(reason.to_string()),
                failures: 0,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn launches(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    struct FakeHost {
        failures: usize,
    }

    #[async_trait]
    impl RunningHost for FakeHost {
        async fn wait(self: Box<Self>) -> Result<Verdict> {
            Ok(Verdict::from_failures(self.failures))
        }
    }

    #[async_trait]
    impl HostLauncher for FakeLauncher {
        async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn RunningHost>> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.launch_error {
                Some(reason) => Err(Error::Launch(reason.clone())),
                None => Ok(Box::new(FakeHost {
                    failures: self.failures,
                })),
            }
        }
    }

    fn settings(root: &Path) -> HostSettings {
        HostSettings {
            extension_path: root.to_path_buf(),
            entry_path: PathBuf::from("/usr/bin/exttest"),
            launch_args: vec![DISABLE_EXTENSIONS_ARG.to_string()],
            default_timeout: Duration::from_secs(2),
        }
    }

    fn suite(files: &[&str]) -> (tempfile::TempDir, ProfileTable) {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            std::fs::write(dir.path().join(f), "").unwrap();
        }
        let table = ProfileTable::builtin(
            dir.path().to_path_buf(),
            "**/*.test.js",
            "vsix.test.js",
            "configuration.test.js",
        );
        (dir, table)
    }

    #[tokio::test]
    async fn test_success_when_host_reports_no_failures() {
        let (dir, table) = suite(&["configuration.test.js"]);
        let launcher = FakeLauncher::reporting(0);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        run.run(SIMPLE).await.unwrap();
        assert_eq!(run.state(), &RunState::Succeeded);

        let requests = launcher.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].profile, SIMPLE);
        assert!(requests[0]
            .launch_args
            .contains(&DISABLE_EXTENSIONS_ARG.to_string()));
    }

    #[tokio::test]
    async fn test_failures_reject_with_count() {
        let (dir, table) = suite(&["a.test.js", "b.test.js", "vsix.test.js"]);
        let launcher = FakeLauncher::reporting(1);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        let err = run.run(FAST).await.unwrap_err();
        assert!(matches!(err, Error::TestsFailed { count: 1 }));
        assert_eq!(run.state(), &RunState::Failed("1 test failed.".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_profile_never_launches() {
        let (dir, table) = suite(&[]);
        let launcher = FakeLauncher::reporting(0);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        let err = run.run("everything").await.unwrap_err();
        assert!(matches!(err, Error::UnknownProfile { .. }));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_missing_root_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let table = ProfileTable::builtin(
            dir.path().join("missing"),
            "**/*.test.js",
            "vsix.test.js",
            "configuration.test.js",
        );
        let launcher = FakeLauncher::reporting(0);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        let err = run.run(FULL).await.unwrap_err();
        assert!(matches!(err, Error::PatternResolution { .. }));
        assert_eq!(launcher.launches(), 0);
        assert!(matches!(run.state(), RunState::Failed(_)));
    }

    #[tokio::test]
    async fn test_launch_error_propagates() {
        let (dir, table) = suite(&["a.test.js"]);
        let launcher = FakeLauncher::broken("host download failed");
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        let err = run.run(FULL).await.unwrap_err();
        assert!(matches!(err, Error::Launch(m) if m == "host download failed"));
    }

    #[tokio::test]
    async fn test_empty_selection_still_succeeds() {
        let (dir, table) = suite(&["a.test.js"]);
        let launcher = FakeLauncher::reporting(0);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        run.run(SIMPLE).await.unwrap();
        assert_eq!(run.state(), &RunState::Succeeded);
    }

    #[tokio::test]
    async fn test_orchestrator_is_single_use() {
        let (dir, table) = suite(&["configuration.test.js"]);
        let launcher = FakeLauncher::reporting(0);
        let mut run = Orchestrator::new(&table, &launcher, settings(dir.path()));

        run.run(SIMPLE).await.unwrap();
        let err = run.run(SIMPLE).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert_eq!(launcher.launches(), 1);
        assert_eq!(run.state(), &RunState::Succeeded);
    }
}
