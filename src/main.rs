// src/main.rs

use anyhow::Result;
use chopsticks::commands;
use chopsticks::config::{Config, DRY_RUN_ENV, REPO_ENV, STATE_ENV};
use clap::builder::FalseyValueParser;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chopsticks")]
#[command(author, version, about = "Dotfile and system package manager with transactional rollback", long_about = None)]
struct Cli {
    /// Package repository directory (default: ~/.config/chopsticks/repo)
    #[arg(long, global = true, env = REPO_ENV, value_name = "DIR")]
    repo: Option<PathBuf>,

    /// Installed-state file (default: ~/.config/chopsticks/state.json)
    #[arg(long, global = true, env = STATE_ENV, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Print the actions that would run without changing anything
    #[arg(long, global = true, env = DRY_RUN_ENV, value_parser = FalseyValueParser::new())]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed packages
    List {
        /// List packages available in the repository instead
        #[arg(short, long)]
        available: bool,
    },
    /// Install packages and their dependencies
    Install {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Uninstall packages (refused while other installed packages depend on them)
    Uninstall {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Update packages to the repository version (updates all if omitted)
    Update {
        /// Package names
        packages: Vec<String>,
    },
    /// Pull the package repository
    Sync,
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli, command: Commands) -> Result<()> {
    let config = || -> Result<Config> {
        let config = Config::resolve(cli.repo.clone(), cli.state.clone(), cli.dry_run)?;
        debug!(
            "Using repository {} and state file {}",
            config.repo_dir.display(),
            config.state_file.display()
        );
        Ok(config)
    };

    let mut out = io::stdout().lock();
    match command {
        Commands::List { available } => commands::list(&config()?, available, &mut out)?,
        Commands::Install { packages } => commands::install(&config()?, &packages, &mut out)?,
        Commands::Uninstall { packages } => commands::uninstall(&config()?, &packages, &mut out)?,
        Commands::Update { packages } => commands::update(&config()?, &packages, &mut out)?,
        Commands::Sync => commands::sync(&config()?, &mut out)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "chopsticks", &mut out)
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command.take() else {
        // Help output failing to write is not worth a different exit code
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::from(2);
    };

    match run(cli, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_requires_packages() {
        assert!(Cli::try_parse_from(["chopsticks", "install"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chopsticks",
            "update",
            "--dry-run",
            "--repo",
            "/srv/repo",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.repo, Some(PathBuf::from("/srv/repo")));
        assert!(matches!(cli.command, Some(Commands::Update { packages }) if packages.is_empty()));
    }
}
