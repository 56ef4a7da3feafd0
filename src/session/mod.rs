//! Test sessions
//!
//! A session is the single execution unit of a run: the selected files
//! plus the display and timeout options the runner applies to them.

pub mod selection;
mod verdict;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::Result;
use crate::profile::Profile;
use crate::runner::TestRunner;

pub use selection::Selection;
pub use verdict::Verdict;

/// Naming style the runner reports cases in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiStyle {
    /// Hierarchical suite/test naming
    #[default]
    Tdd,
}

impl UiStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiStyle::Tdd => "tdd",
        }
    }
}

impl fmt::Display for UiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options applied to every file in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub ui: UiStyle,
    pub color: bool,
    /// Per-test-file timeout
    pub timeout: Duration,
}

/// One run's execution context
///
/// Files are registered before execution; `execute` consumes the session.
#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    files: Vec<PathBuf>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            files: Vec::new(),
        }
    }

    /// Register a test file; files run in registration order
    pub fn add_file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Run every registered file once and reduce to a verdict
    pub async fn execute(self, runner: &dyn TestRunner) -> Result<Verdict> {
        if self.files.is_empty() {
            tracing::info!("No test files selected, nothing to run");
            return Ok(Verdict::default());
        }

        tracing::info!(
            files = self.files.len(),
            timeout_ms = self.options.timeout.as_millis() as u64,
            ui = %self.options.ui,
            "Executing session"
        );

        let failures = runner.run(&self.files, &self.options).await?;
        Ok(Verdict::from_failures(failures))
    }
}

/// Resolve a profile's selection and load it into a fresh session
pub fn build(profile: &Profile, host_default_timeout: Duration) -> Result<Session> {
    let selection = selection::resolve(profile)?;
    if selection.is_empty() {
        tracing::warn!(profile = %profile.name, "Selection is empty");
    }

    let mut session = Session::new(SessionOptions {
        ui: UiStyle::Tdd,
        color: true,
        timeout: profile.effective_timeout(host_default_timeout),
    });
    for path in selection.into_paths() {
        session.add_file(path);
    }

    Ok(session)
}
