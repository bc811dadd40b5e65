// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn global_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("repo")
            .long("repo")
            .value_name("DIR")
            .global(true)
            .help("Package repository directory (default: ~/.config/chopsticks/repo)"),
    )
    .arg(
        Arg::new("state")
            .long("state")
            .value_name("FILE")
            .global(true)
            .help("Installed-state file (default: ~/.config/chopsticks/state.json)"),
    )
    .arg(
        Arg::new("dry_run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Print the actions that would run without changing anything"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Enable debug logging"),
    )
}

fn packages_arg(required: bool) -> Arg {
    Arg::new("packages")
        .num_args(1..)
        .required(required)
        .help("Package names")
}

fn build_cli() -> Command {
    global_args(
        Command::new("chopsticks")
            .version(env!("CARGO_PKG_VERSION"))
            .author("Chopsticks Contributors")
            .about("Dotfile and system package manager with transactional rollback")
            .subcommand_required(false),
    )
    .subcommand(
        Command::new("list").about("List installed packages").arg(
            Arg::new("available")
                .short('a')
                .long("available")
                .action(ArgAction::SetTrue)
                .help("List packages available in the repository instead"),
        ),
    )
    .subcommand(
        Command::new("install")
            .about("Install packages and their dependencies")
            .arg(packages_arg(true)),
    )
    .subcommand(
        Command::new("uninstall")
            .about("Uninstall packages (refused while other installed packages depend on them)")
            .arg(packages_arg(true)),
    )
    .subcommand(
        Command::new("update")
            .about("Update packages to the repository version (updates all if omitted)")
            .arg(packages_arg(false)),
    )
    .subcommand(Command::new("sync").about("Pull the package repository"))
    .subcommand(
        Command::new("completions")
            .about("Generate shell completion scripts")
            .arg(
                Arg::new("shell")
                    .required(true)
                    .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                    .help("Shell type"),
            ),
    )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("chopsticks.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
