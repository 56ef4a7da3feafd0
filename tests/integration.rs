//! End-to-end tests for the exttest CLI
//!
//! These tests build a throwaway suite on disk, point the harness at it
//! through `EXTTEST_CONFIG`, and run the real binary. The binary hosts
//! its own entry point and executes each test file with `sh`, so a test
//! file passes by exiting 0.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Test context with a suite directory and config file
struct TestContext {
    /// Keeps the temporary directory alive for the test
    _temp: tempfile::TempDir,
    /// Extension directory; the suite lives in `suite/` below it
    extension_dir: PathBuf,
    /// Config file passed via EXTTEST_CONFIG
    config_path: PathBuf,
    /// XDG_DATA_HOME so the entry log stays inside the temp dir
    data_dir: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let extension_dir = temp.path().join("ext");
        let data_dir = temp.path().join("data");
        fs::create_dir_all(extension_dir.join("suite")).expect("Failed to create suite dir");
        fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        let ctx = Self {
            config_path: temp.path().join("config.toml"),
            extension_dir,
            data_dir,
            _temp: temp,
        };
        ctx.write_config("");
        ctx
    }

    /// Write the config file, appending `extra` TOML after the defaults
    fn write_config(&self, extra: &str) {
        let config = format!(
            "[suite]\nextension_path = \"{}\"\nroot = \"suite\"\n\n[runner]\ninterpreter = \"sh\"\n\n{}",
            self.extension_dir.display(),
            extra
        );
        fs::write(&self.config_path, config).expect("Failed to write config");
    }

    fn suite_dir(&self) -> PathBuf {
        self.extension_dir.join("suite")
    }

    /// Add a test file to the suite whose body is a shell script
    fn add_test(&self, name: &str, body: &str) {
        let path = self.suite_dir().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).expect("Failed to write test file");
    }

    fn marker(&self, name: &str) -> PathBuf {
        self.suite_dir().join(format!("{}.ran", name))
    }

    /// Test body that passes and leaves a marker behind
    fn passing(&self, name: &str) -> String {
        format!("touch '{}'\nexit 0\n", self.marker(name).display())
    }

    /// Test body that fails and leaves a marker behind
    fn failing(&self, name: &str) -> String {
        format!("touch '{}'\nexit 1\n", self.marker(name).display())
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_exttest"))
            .args(args)
            .env("EXTTEST_CONFIG", &self.config_path)
            .env("XDG_DATA_HOME", &self.data_dir)
            .env("XDG_CONFIG_HOME", &self.data_dir)
            .env_remove("EXTTEST_PROFILE")
            .env_remove("EXTTEST_REPORT")
            .env_remove("EXTTEST_EXTENSION_PATH")
            .env_remove("RUST_LOG")
            .current_dir(self.extension_dir.parent().unwrap())
            .output()
            .expect("Failed to run exttest")
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn ran(path: &Path) -> bool {
    path.exists()
}

#[test]
fn simple_profile_runs_configuration_test() {
    let ctx = TestContext::new();
    ctx.add_test("configuration.test.js", &ctx.passing("configuration"));
    ctx.add_test("a.test.js", &ctx.failing("a"));

    let output = ctx.run(&["simple"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(ran(&ctx.marker("configuration")));
    assert!(!ran(&ctx.marker("a")));
}

#[test]
fn fast_profile_skips_slow_file_and_reports_failures() {
    let ctx = TestContext::new();
    ctx.add_test("a.test.js", &ctx.passing("a"));
    ctx.add_test("b.test.js", &ctx.failing("b"));
    ctx.add_test("vsix.test.js", &ctx.failing("vsix"));

    let output = ctx.run(&["fast"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("1 test failed."), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1 failing"), "stdout: {}", stdout(&output));
    assert!(ran(&ctx.marker("a")));
    assert!(ran(&ctx.marker("b")));
    assert!(!ran(&ctx.marker("vsix")));
}

#[test]
fn simple_profile_without_match_is_vacuous_success() {
    let ctx = TestContext::new();
    ctx.add_test("a.test.js", &ctx.failing("a"));

    let output = ctx.run(&["simple"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(!ran(&ctx.marker("a")));
}

#[test]
fn full_profile_runs_everything() {
    let ctx = TestContext::new();
    ctx.add_test("a.test.js", &ctx.passing("a"));
    ctx.add_test("nested/c.test.js", &ctx.passing("c"));
    ctx.add_test("vsix.test.js", &ctx.passing("vsix"));

    let output = ctx.run(&["full"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(ran(&ctx.marker("a")));
    assert!(ran(&ctx.marker("c")));
    assert!(ran(&ctx.marker("vsix")));
}

#[test]
fn profile_timeout_override_fails_slow_tests() {
    let ctx = TestContext::new();
    ctx.write_config("[profiles.full]\ntimeout_ms = 300\n");
    ctx.add_test("slow.test.js", "exec sleep 5\n");
    ctx.add_test("quick.test.js", &ctx.passing("quick"));

    let output = ctx.run(&["full"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("1 test failed."), "stderr: {}", stderr(&output));
    assert!(ran(&ctx.marker("quick")));
}

#[test]
fn missing_suite_root_fails_before_launch() {
    let ctx = TestContext::new();
    fs::remove_dir_all(ctx.suite_dir()).unwrap();

    let output = ctx.run(&["full"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("Failed to resolve pattern"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn override_for_unknown_profile_is_rejected() {
    let ctx = TestContext::new();
    ctx.write_config("[profiles.nightly]\ntimeout_ms = 1\n");

    let output = ctx.run(&["full"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("Unknown profile 'nightly'"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn profiles_command_lists_builtin_profiles() {
    let ctx = TestContext::new();

    let output = ctx.run(&["profiles"]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("fast (**/*.test.js, excluding **/vsix.test.js, timeout 10000ms)"));
    assert!(out.contains("simple (configuration.test.js, timeout 5000ms)"));
    assert!(out.contains("full (**/*.test.js, host default timeout)"));
}

#[test]
fn profile_commands_take_no_arguments() {
    let ctx = TestContext::new();

    let output = ctx.run(&["fast", "--timeout", "5"]);

    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn entry_outside_host_fails() {
    let ctx = TestContext::new();

    let output = ctx.run(&["entry"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("EXTTEST_PROFILE"), "stderr: {}", stderr(&output));
}
