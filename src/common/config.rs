//! Configuration file handling

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::paths::{absolutize, config_path};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where the component under test and its compiled suite live
    #[serde(default)]
    pub suite: SuiteConfig,

    /// Isolated host settings
    #[serde(default)]
    pub host: HostConfig,

    /// Embedded test runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Per-profile overrides, keyed by built-in profile name
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileOverride>,
}

/// Suite layout
#[derive(Debug, Deserialize)]
pub struct SuiteConfig {
    /// Path to the component (extension) under test
    #[serde(default = "default_extension_path")]
    pub extension_path: PathBuf,

    /// Suite root; relative paths are resolved against `extension_path`
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Pattern matching every test file under the root
    #[serde(default = "default_test_glob")]
    pub test_glob: String,

    /// Slow integration file left out by the `fast` profile
    #[serde(default = "default_slow_file")]
    pub slow_file: String,

    /// Configuration test file run alone by the `simple` profile
    #[serde(default = "default_config_file")]
    pub config_file: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            extension_path: default_extension_path(),
            root: default_root(),
            test_glob: default_test_glob(),
            slow_file: default_slow_file(),
            config_file: default_config_file(),
        }
    }
}

fn default_extension_path() -> PathBuf {
    PathBuf::from(".")
}
fn default_root() -> PathBuf {
    PathBuf::from("out/test/suite")
}
fn default_test_glob() -> String {
    "**/*.test.js".to_string()
}
fn default_slow_file() -> String {
    "vsix.test.js".to_string()
}
fn default_config_file() -> String {
    "configuration.test.js".to_string()
}

impl SuiteConfig {
    /// Absolute path of the component under test
    pub fn extension_dir(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(absolutize(&cwd, &self.extension_path))
    }

    /// Absolute suite root
    pub fn root_dir(&self) -> Result<PathBuf> {
        Ok(absolutize(&self.extension_dir()?, &self.root))
    }
}

/// Isolated host settings
#[derive(Debug, Deserialize)]
pub struct HostConfig {
    /// External host executable; when unset the harness hosts its own entry point
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Extra arguments passed to the host before the launch arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout used by profiles that don't set their own
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            executable: None,
            args: Vec::new(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2_000
}

/// Embedded runner settings
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter each test file is executed with
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Arguments placed between the interpreter and the test file
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            args: Vec::new(),
        }
    }
}

fn default_interpreter() -> String {
    "node".to_string()
}

/// Field overrides for a built-in profile
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProfileOverride {
    pub root: Option<PathBuf>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
