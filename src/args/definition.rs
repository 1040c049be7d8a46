//! Command-line argument definition and processing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hoist - install container images as local executables and review the access they request
#[derive(Parser, Debug)]
#[command(name = "hoist")]
#[command(version)]
#[command(about = "Install container images as local executables and review the access they request", long_about = None)]
pub struct Args {
    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every difference between two package files
    Diff {
        /// Currently installed package file
        installed: PathBuf,
        /// Candidate package file
        candidate: PathBuf,
    },
    /// Show the access a package file requests, or how an update changes it
    Permissions {
        /// Candidate package file
        candidate: PathBuf,
        /// Installed package file to compare against (fresh install when omitted)
        #[arg(long)]
        installed: Option<PathBuf>,
    },
    /// Compare an installed package with the configuration its image now declares
    Check {
        /// Installed package name or path to its file
        package: String,
    },
    /// List installed packages
    List,
}

/// What: Run the selected subcommand.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Text to print on stdout.
///
/// # Errors
/// - Returns the handler's error when a package, the configuration or the image cannot be read
///
/// Details:
/// - Configuration is only loaded by commands that need the install path or engine.
pub fn process_args(args: &Args) -> super::HandlerResult {
    use crate::args::{check, diff, list, permissions};

    match &args.command {
        Command::Diff {
            installed,
            candidate,
        } => diff::handle_diff(installed, candidate),
        Command::Permissions {
            candidate,
            installed,
        } => permissions::handle_permissions(candidate, installed.as_deref()),
        Command::Check { package } => {
            let config = crate::config::load()?;
            check::handle_check(&config, package)
        }
        Command::List => {
            let config = crate::config::load()?;
            list::handle_list(&config)
        }
    }
}
