//! Command-line interface definitions for retrace.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The definitions are shared between the main binary, the interactive shell, and
//! build tools (like xtask) for man page generation.

#![allow(missing_docs)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for retrace.
#[derive(Parser)]
#[command(
    name = "retrace",
    version = crate::VERSION,
    about = "Track files in a directory and back them up when they change",
    long_about = "Remembers a SHA-256 fingerprint of each tracked file, reports which files \
                  changed since their last backup, and copies files to and from one backup \
                  slot per file"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Directory to work in (defaults to core.default_directory, then the current directory)
    #[arg(short = 'C', long = "dir", global = true, env = "RETRACE_DIR")]
    pub directory: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking a directory (discards any existing registry there)
    Init {
        /// Directory to initialize (defaults to --dir or the current directory)
        path: Option<PathBuf>,
    },

    /// List tracked files
    Files {
        /// Show hash, size, and backup state
        #[arg(short, long)]
        long: bool,
    },

    /// Start tracking files by name
    #[command(alias = "add")]
    Track {
        /// File names inside the tracked directory
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List files changed since their last backup, or check one file
    Check {
        /// Only check this file
        name: Option<String>,
    },

    /// Copy files into their backup slots
    Backup(BatchArgs),

    /// Copy files back from their backup slots
    Restore(BatchArgs),

    /// Get and set configuration options
    Config {
        /// Configuration key (section.key)
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Unset the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Run an interactive session that keeps one registry loaded
    Shell,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// File selection shared by backup and restore.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// File names to process
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub names: Vec<String>,

    /// Process every tracked file
    #[arg(short, long)]
    pub all: bool,
}

/// One line typed into the interactive shell.
#[derive(Parser)]
#[command(multicall = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands accepted by the interactive shell.
#[derive(Subcommand)]
pub enum ShellCommand {
    /// Open the registry of a tracked directory
    Load {
        /// Directory to load
        path: PathBuf,
    },

    /// Start tracking a directory and switch to it
    Init {
        /// Directory to initialize
        path: PathBuf,
    },

    /// List tracked files
    Files {
        /// Show hash, size, and backup state
        #[arg(short, long)]
        long: bool,
    },

    /// Start tracking files by name
    #[command(alias = "add")]
    Track {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List changed files, or check one file
    Check { name: Option<String> },

    /// Copy files into their backup slots
    Backup(BatchArgs),

    /// Copy files back from their backup slots
    Restore(BatchArgs),

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}
