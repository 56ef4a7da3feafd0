//! Embedded test runner
//!
//! Executes the files of a session and reports how many failed. Execution
//! never stops at the first failure.

mod process;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::common::Result;
use crate::session::SessionOptions;

pub use process::ProcessRunner;

/// Runs registered test files and counts failures
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Run every file exactly once, in order, returning the failure count
    async fn run(&self, files: &[PathBuf], options: &SessionOptions) -> Result<usize>;
}
