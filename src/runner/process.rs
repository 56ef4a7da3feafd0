//! Runner that executes each test file with an interpreter
//!
//! Every file is one test case; its suite is the directory it lives in.
//! A case fails when the interpreter exits non-zero, can't be started, or
//! outlives the session timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use colored::Colorize;
use tokio::process::Command as TokioCommand;

use crate::common::config::RunnerConfig;
use crate::common::{Error, Result};
use crate::session::SessionOptions;

use super::TestRunner;

/// Result of running one test file
#[derive(Debug, Clone, PartialEq, Eq)]
enum CaseOutcome {
    Passed,
    Failed(String),
}

/// Executes test files as `<interpreter> [args] <file>`
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: PathBuf,
    args: Vec<String>,
}

impl ProcessRunner {
    pub fn new(interpreter: PathBuf, args: Vec<String>) -> Self {
        Self { interpreter, args }
    }

    /// Locate the configured interpreter on PATH
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let interpreter = which::which(&config.interpreter).map_err(|e| {
            Error::Runner(format!(
                "Interpreter '{}' not found: {}",
                config.interpreter, e
            ))
        })?;
        Ok(Self::new(interpreter, config.args.clone()))
    }

    async fn run_file(&self, file: &Path, options: &SessionOptions) -> CaseOutcome {
        let mut cmd = TokioCommand::new(&self.interpreter);
        cmd.args(&self.args)
            .arg(file)
            .env("EXTTEST_UI", options.ui.as_str())
            .env(
                "EXTTEST_TIMEOUT_MS",
                options.timeout.as_millis().to_string(),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if options.color {
            cmd.env("FORCE_COLOR", "1");
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return CaseOutcome::Failed(format!("failed to start: {}", e)),
        };

        let waited = tokio::time::timeout(options.timeout, child.wait()).await;
        match waited {
            Ok(Ok(status)) if status.success() => CaseOutcome::Passed,
            Ok(Ok(status)) => CaseOutcome::Failed(match status.code() {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            }),
            Ok(Err(e)) => CaseOutcome::Failed(format!("failed to wait: {}", e)),
            Err(_) => {
                let _ = child.kill().await;
                CaseOutcome::Failed(format!(
                    "timeout of {}ms exceeded",
                    options.timeout.as_millis()
                ))
            }
        }
    }
}

#[async_trait]
impl TestRunner for ProcessRunner {
    async fn run(&self, files: &[PathBuf], options: &SessionOptions) -> Result<usize> {
        colored::control::set_override(options.color);

        let mut passed = 0usize;
        let mut failed: Vec<(String, String)> = Vec::new();
        let mut current_suite: Option<String> = None;

        for file in files {
            let suite = suite_name(file);
            if current_suite.as_deref() != Some(suite.as_str()) {
                println!("\n  {}", suite.bold());
                current_suite = Some(suite.clone());
            }

            let case = case_name(file);
            let started = Instant::now();
            let outcome = self.run_file(file, options).await;
            let elapsed = started.elapsed().as_millis();

            match outcome {
                CaseOutcome::Passed => {
                    passed += 1;
                    println!(
                        "    {} {} {}",
                        "✓".green(),
                        case,
                        format!("({}ms)", elapsed).dimmed()
                    );
                }
                CaseOutcome::Failed(reason) => {
                    println!("    {} {}", format!("{})", failed.len() + 1).red(), case.red());
                    tracing::debug!(file = %file.display(), %reason, "Test file failed");
                    failed.push((format!("{} {}", suite, case), reason));
                }
            }
        }

        println!("\n  {}", format!("{} passing", passed).green());
        if !failed.is_empty() {
            println!("  {}\n", format!("{} failing", failed.len()).red());
            for (i, (title, reason)) in failed.iter().enumerate() {
                println!("  {}) {}", i + 1, title);
                println!("     {}", reason.red());
            }
        }
        println!();

        Ok(failed.len())
    }
}

fn suite_name(file: &Path) -> String {
    file.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "suite".to_string())
}

fn case_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}
