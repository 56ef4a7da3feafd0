//! exttest - profile-driven test selection for extension suites
//!
//! Picks the test files a named profile asks for, runs them as one session
//! inside an isolated host process, and reduces the outcome to a single
//! pass/fail result.

pub mod cli;
pub mod commands;
pub mod common;
pub mod host;
pub mod profile;
pub mod runner;
pub mod session;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use profile::{Profile, ProfileTable};
pub use session::{Session, Verdict};
