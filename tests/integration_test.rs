// tests/integration_test.rs

//! Integration tests for Chopsticks
//!
//! These drive the command flows against a package repository built in a
//! temporary directory and check the resulting filesystem and state file.

use chopsticks::commands;
use chopsticks::config::Config;
use chopsticks::state::State;
use chopsticks::Error;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
    config: Config,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().join("repo"), dir.path().join("state.json"), false);
        fs::create_dir_all(&config.repo_dir).unwrap();
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn log(&self) -> PathBuf {
        self.path("log.txt")
    }

    fn define(&self, name: &str, body: &str) {
        let pkg_dir = self.config.repo_dir.join(name);
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("pkg.toml"), body).unwrap();
    }

    /// A package that records its install and uninstall in the shared log
    fn define_logged(&self, name: &str, version: &str, deps: &[&str]) {
        let deps: Vec<String> = deps.iter().map(|d| format!("\"{}\"", d)).collect();
        self.define(
            name,
            &format!(
                r#"
name = "{name}"
version = "{version}"
dependencies = [{deps}]

[[install]]
action = "append_line"
path = "{log}"
line = "install {name}"

[[uninstall]]
action = "append_line"
path = "{log}"
line = "uninstall {name}"
"#,
                deps = deps.join(", "),
                log = self.log().display(),
            ),
        );
    }

    fn state(&self) -> State {
        State::load(&self.config.state_file).unwrap()
    }

    fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_install_creates_file_and_records_state() {
    let sandbox = Sandbox::new();
    let target = sandbox.path("home/.config/a/config");
    sandbox.define(
        "a",
        &format!(
            r#"
name = "a"
version = "1.0"

[[install]]
action = "create_dir"
path = "{dir}"

[[install]]
action = "create_file"
path = "{file}"
content = "hello"
"#,
            dir = target.parent().unwrap().display(),
            file = target.display(),
        ),
    );

    let mut out = Vec::new();
    commands::install(&sandbox.config, &names(&["a"]), &mut out).unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
    assert_eq!(sandbox.state().get("a").unwrap().version, "1.0");

    let mut out = Vec::new();
    commands::install(&sandbox.config, &names(&["a"]), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "All targets are up-to-date.\n");
}

#[test]
fn test_dependencies_install_first_and_uninstall_last() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("base", "1", &[]);
    sandbox.define_logged("shell", "1", &["base"]);
    sandbox.define_logged("editor", "1", &["base", "shell"]);

    let mut out = Vec::new();
    commands::install(&sandbox.config, &names(&["editor"]), &mut out).unwrap();
    assert_eq!(
        sandbox.log_lines(),
        vec!["install base", "install shell", "install editor"]
    );

    let mut out = Vec::new();
    commands::uninstall(&sandbox.config, &names(&["base", "editor", "shell"]), &mut out).unwrap();
    assert_eq!(
        &sandbox.log_lines()[3..],
        &["uninstall editor", "uninstall shell", "uninstall base"]
    );
    assert!(sandbox.state().is_empty());
}

#[test]
fn test_uninstall_blocked_by_installed_dependent() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("a", "1", &[]);
    sandbox.define_logged("b", "1", &["a"]);

    let mut out = Vec::new();
    commands::install(&sandbox.config, &names(&["b"]), &mut out).unwrap();

    let mut out = Vec::new();
    let err = commands::uninstall(&sandbox.config, &names(&["a"]), &mut out).unwrap_err();
    match err {
        Error::RequiredBy { target, dependent } => {
            assert_eq!(target, "a");
            assert_eq!(dependent, "b");
        }
        other => panic!("expected RequiredBy, got {other:?}"),
    }
    assert!(sandbox.state().is_installed("a"));
    assert!(sandbox.state().is_installed("b"));
}

#[test]
fn test_dry_run_leaves_state_untouched() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("a", "1", &[]);
    let config = Config::new(&sandbox.config.repo_dir, &sandbox.config.state_file, true);

    let mut out = Vec::new();
    commands::install(&config, &names(&["a"]), &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains("Installing a-1"));
    assert!(output.contains("  DRY-RUN: AppendLine("));
    assert!(!sandbox.config.state_file.exists());
    assert!(sandbox.log_lines().is_empty());
}

#[test]
fn test_failed_action_rolls_back_package() {
    let sandbox = Sandbox::new();
    let created = sandbox.path("created.txt");
    sandbox.define(
        "flaky",
        &format!(
            r#"
name = "flaky"
version = "1"

[[install]]
action = "create_file"
path = "{file}"
content = "temporary"

[[install]]
action = "run_shell"
script = "exit 3"
"#,
            file = created.display(),
        ),
    );

    let mut out = Vec::new();
    let err = commands::install(&sandbox.config, &names(&["flaky"]), &mut out).unwrap_err();
    assert!(matches!(err, Error::ActionFailed { .. }));
    assert!(!created.exists());
    assert!(!sandbox.state().is_installed("flaky"));
}

#[test]
fn test_cycle_reported_before_any_action() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("a", "1", &["b"]);
    sandbox.define_logged("b", "1", &["a"]);

    let mut out = Vec::new();
    let err = commands::install(&sandbox.config, &names(&["a"]), &mut out).unwrap_err();
    assert!(matches!(err, Error::DependencyCycle { .. }));
    assert!(sandbox.log_lines().is_empty());
}

#[test]
fn test_missing_dependency_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("a", "1", &["ghost"]);

    let mut out = Vec::new();
    let err = commands::install(&sandbox.config, &names(&["a"]), &mut out).unwrap_err();
    assert!(matches!(err, Error::PackageNotFound(name) if name == "ghost"));
}

fn chopsticks(sandbox: &Sandbox, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chopsticks"))
        .args(args)
        .env("CHOPSTICKS_REPO", &sandbox.config.repo_dir)
        .env("CHOPSTICKS_STATE", &sandbox.config.state_file)
        .env_remove("CHOPSTICKS_DRY_RUN")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_binary_exit_codes() {
    let sandbox = Sandbox::new();
    sandbox.define_logged("a", "1", &[]);

    let output = chopsticks(&sandbox, &[]);
    assert_eq!(output.status.code(), Some(2));

    let output = chopsticks(&sandbox, &["install", "a"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Installing a-1"));

    let output = chopsticks(&sandbox, &["list"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("a 1 "));

    let output = chopsticks(&sandbox, &["uninstall", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not installed: nope"));
}

#[test]
fn test_binary_generates_completions() {
    let sandbox = Sandbox::new();
    let output = chopsticks(&sandbox, &["completions", "bash"]);
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}
