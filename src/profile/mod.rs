//! Test profiles
//!
//! A profile names a subset of the suite and the timeout it runs under.
//! The table is built once at startup from the built-in definitions plus
//! any overrides in the configuration file, then only ever read.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::config::Config;
use crate::common::{Error, Result};

/// Everything except the slow integration file
pub const FAST: &str = "fast";
/// Only the configuration test file
pub const SIMPLE: &str = "simple";
/// The whole suite
pub const FULL: &str = "full";

const FAST_TIMEOUT_MS: u64 = 10_000;
const SIMPLE_TIMEOUT_MS: u64 = 5_000;

/// A named file-selection specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Absolute directory the patterns are resolved against
    pub root: PathBuf,
    /// Inclusion pattern, relative to `root`
    pub include: String,
    /// Exclusion pattern, matched against root-relative paths
    pub exclude: Option<String>,
    /// `None` means the host default timeout
    pub timeout: Option<Duration>,
}

impl Profile {
    /// Timeout this profile runs under
    pub fn effective_timeout(&self, host_default: Duration) -> Duration {
        self.timeout.unwrap_or(host_default)
    }

    fn validate(&self) -> Result<()> {
        if self.include.trim().is_empty() {
            return Err(Error::invalid_profile(
                &self.name,
                "inclusion pattern must not be empty",
            ));
        }
        if self.exclude.as_deref() == Some(self.include.as_str()) {
            tracing::warn!(
                profile = %self.name,
                pattern = %self.include,
                "Exclusion pattern equals inclusion pattern, selection will be empty"
            );
        }
        Ok(())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.name, self.include)?;
        if let Some(exclude) = &self.exclude {
            write!(f, ", excluding {}", exclude)?;
        }
        match self.timeout {
            Some(t) => write!(f, ", timeout {}ms)", t.as_millis()),
            None => write!(f, ", host default timeout)"),
        }
    }
}

/// Read-only lookup table from profile name to profile
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: Vec<Profile>,
}

impl ProfileTable {
    /// The built-in profiles for a suite rooted at `root`
    pub fn builtin(root: PathBuf, test_glob: &str, slow_file: &str, config_file: &str) -> Self {
        Self {
            profiles: vec![
                Profile {
                    name: FAST.to_string(),
                    root: root.clone(),
                    include: test_glob.to_string(),
                    exclude: Some(format!("**/{}", slow_file)),
                    timeout: Some(Duration::from_millis(FAST_TIMEOUT_MS)),
                },
                Profile {
                    name: SIMPLE.to_string(),
                    root: root.clone(),
                    include: config_file.to_string(),
                    exclude: None,
                    timeout: Some(Duration::from_millis(SIMPLE_TIMEOUT_MS)),
                },
                Profile {
                    name: FULL.to_string(),
                    root,
                    include: test_glob.to_string(),
                    exclude: None,
                    timeout: None,
                },
            ],
        }
    }

    /// Build the table from configuration, applying per-profile overrides
    ///
    /// Overrides naming a profile that isn't built in are rejected rather
    /// than ignored.
    pub fn from_config(config: &Config) -> Result<Self> {
        let root = config.suite.root_dir()?;
        let mut table = Self::builtin(
            root.clone(),
            &config.suite.test_glob,
            &config.suite.slow_file,
            &config.suite.config_file,
        );

        for (name, over) in &config.profiles {
            let known: Vec<String> = table.names().into_iter().map(String::from).collect();
            let profile = table
                .profiles
                .iter_mut()
                .find(|p| &p.name == name)
                .ok_or_else(|| Error::unknown_profile(name, &known))?;

            if let Some(r) = &over.root {
                profile.root = crate::common::paths::absolutize(&root, r);
            }
            if let Some(include) = &over.include {
                profile.include = include.clone();
            }
            if let Some(exclude) = &over.exclude {
                profile.exclude = (!exclude.is_empty()).then(|| exclude.clone());
            }
            if let Some(ms) = over.timeout_ms {
                profile.timeout = Some(Duration::from_millis(ms));
            }
        }

        for profile in &table.profiles {
            profile.validate()?;
        }

        Ok(table)
    }

    /// Look up a profile by name
    pub fn resolve(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::unknown_profile(name, &self.names()))
    }

    /// Profile names in definition order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }
}
