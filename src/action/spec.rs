// src/action/spec.rs

//! Declarative action entries as they appear in `pkg.toml`
//!
//! Each `[[install]]`, `[[uninstall]]` or `[[update]]` table carries an
//! `action` tag selecting the variant:
//!
//! ```toml
//! [[install]]
//! action = "create_link"
//! link = "~/.config/kitty"
//! target = "~/.config/chopsticks/repo/kitty/config"
//! ```

use crate::action::fs::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::action::{
    Action, AppendLine, CreateDir, CreateFile, CreateLink, DeleteDir, DeleteFile, DeleteLink,
    PacmanInstall, RemoveLastLine, RunCommand, RunShell, SystemdStart, SystemdStop, UfwAllow,
    UfwDeny,
};
use crate::error::Result;
use crate::filesystem::expand_home;
use serde::Deserialize;

/// A command given either as one shell-style string or as an argv list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandLine {
    Line(String),
    Argv(Vec<String>),
}

fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

/// One action entry in a package definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionSpec {
    RunCommand {
        cmd: CommandLine,
        cwd: Option<String>,
    },
    RunShell {
        script: String,
        cwd: Option<String>,
    },
    CreateDir {
        path: String,
        #[serde(default = "default_dir_mode")]
        mode: u32,
    },
    DeleteDir {
        path: String,
    },
    CreateFile {
        path: String,
        content: String,
        #[serde(default = "default_file_mode")]
        mode: u32,
    },
    DeleteFile {
        path: String,
    },
    CreateLink {
        link: String,
        target: String,
    },
    DeleteLink {
        link: String,
    },
    AppendLine {
        path: String,
        line: String,
    },
    RemoveLastLine {
        path: String,
    },
    SystemdStart {
        unit: String,
    },
    SystemdStop {
        unit: String,
    },
    UfwAllow {
        rule: String,
    },
    UfwDeny {
        rule: String,
    },
    PacmanInstall {
        packages: Vec<String>,
    },
}

impl ActionSpec {
    /// Build the runnable action, expanding `~` in paths
    pub fn into_action(self) -> Result<Box<dyn Action>> {
        let action: Box<dyn Action> = match self {
            ActionSpec::RunCommand { cmd, cwd } => {
                let cwd = cwd.as_deref().map(expand_home);
                match cmd {
                    CommandLine::Line(line) => Box::new(RunCommand::parse(&line, cwd)?),
                    CommandLine::Argv(argv) => Box::new(RunCommand::new(argv, cwd)?),
                }
            }
            ActionSpec::RunShell { script, cwd } => {
                Box::new(RunShell::new(script, cwd.as_deref().map(expand_home)))
            }
            ActionSpec::CreateDir { path, mode } => Box::new(CreateDir::new(expand_home(&path), mode)),
            ActionSpec::DeleteDir { path } => Box::new(DeleteDir::new(expand_home(&path))),
            ActionSpec::CreateFile {
                path,
                content,
                mode,
            } => Box::new(CreateFile::new(expand_home(&path), content, mode)),
            ActionSpec::DeleteFile { path } => Box::new(DeleteFile::new(expand_home(&path))),
            ActionSpec::CreateLink { link, target } => {
                Box::new(CreateLink::new(expand_home(&link), expand_home(&target)))
            }
            ActionSpec::DeleteLink { link } => Box::new(DeleteLink::new(expand_home(&link))),
            ActionSpec::AppendLine { path, line } => {
                Box::new(AppendLine::new(expand_home(&path), line))
            }
            ActionSpec::RemoveLastLine { path } => Box::new(RemoveLastLine::new(expand_home(&path))),
            ActionSpec::SystemdStart { unit } => Box::new(SystemdStart::new(unit)),
            ActionSpec::SystemdStop { unit } => Box::new(SystemdStop::new(unit)),
            ActionSpec::UfwAllow { rule } => Box::new(UfwAllow::new(rule)),
            ActionSpec::UfwDeny { rule } => Box::new(UfwDeny::new(rule)),
            ActionSpec::PacmanInstall { packages } => Box::new(PacmanInstall::new(packages)),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Doc {
        install: Vec<ActionSpec>,
    }

    fn parse(input: &str) -> Vec<ActionSpec> {
        toml::from_str::<Doc>(input).unwrap().install
    }

    #[test]
    fn test_parse_command_forms() {
        let specs = parse(
            r#"
[[install]]
action = "run_command"
cmd = "git clone https://example.test/repo.git"

[[install]]
action = "run_command"
cmd = ["echo", "a b"]
cwd = "/tmp"
"#,
        );
        assert_eq!(
            specs[0],
            ActionSpec::RunCommand {
                cmd: CommandLine::Line("git clone https://example.test/repo.git".to_string()),
                cwd: None,
            }
        );
        assert_eq!(
            specs[1],
            ActionSpec::RunCommand {
                cmd: CommandLine::Argv(vec!["echo".to_string(), "a b".to_string()]),
                cwd: Some("/tmp".to_string()),
            }
        );
    }

    #[test]
    fn test_modes_default_and_octal() {
        let specs = parse(
            r#"
[[install]]
action = "create_dir"
path = "/tmp/a"

[[install]]
action = "create_file"
path = "/tmp/a/b"
content = "x"
mode = 0o600
"#,
        );
        assert_eq!(
            specs[0],
            ActionSpec::CreateDir {
                path: "/tmp/a".to_string(),
                mode: 0o755,
            }
        );
        assert!(matches!(specs[1], ActionSpec::CreateFile { mode: 0o600, .. }));
    }

    #[test]
    fn test_unknown_action_tag_rejected() {
        let result = toml::from_str::<Doc>(
            r#"
[[install]]
action = "format_disk"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_action_describes_variant() {
        let specs = parse(
            r#"
[[install]]
action = "create_link"
link = "/tmp/link"
target = "/tmp/target"

[[install]]
action = "systemd_start"
unit = "sshd.service"

[[install]]
action = "pacman_install"
packages = ["kitty"]
"#,
        );
        let descriptions: Vec<String> = specs
            .into_iter()
            .map(|spec| spec.into_action().unwrap().describe())
            .collect();
        assert_eq!(
            descriptions,
            vec![
                "CreateLink(/tmp/link -> /tmp/target)",
                "SystemdStart(sshd.service)",
                "PacmanInstall(kitty)",
            ]
        );
    }

    #[test]
    fn test_into_action_rejects_bad_command() {
        let spec = ActionSpec::RunCommand {
            cmd: CommandLine::Argv(Vec::new()),
            cwd: None,
        };
        assert!(spec.into_action().is_err());
    }
}
