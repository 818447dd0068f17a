//! Release tooling for retrace: man pages and completion scripts.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Release tooling for retrace")]
enum Task {
    /// Generate man pages from the CLI definitions
    GenerateManPages {
        /// Output directory for man pages
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },

    /// Write completion scripts for every supported shell
    GenerateCompletions {
        /// Output directory for completion scripts
        #[arg(short, long, default_value = "completions")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Task::parse() {
        Task::GenerateManPages { output } => generate_man_pages(&output),
        Task::GenerateCompletions { output } => generate_completions(&output),
    }
}

fn create_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}

fn render_man(cmd: clap::Command, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    clap_mangen::Man::new(cmd).render(&mut std::io::BufWriter::new(file))?;
    println!("✓ Generated: {}", path.display());
    Ok(())
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    create_output_dir(output_dir)?;

    let cmd = retrace::cli::Cli::command();
    render_man(cmd.clone(), &output_dir.join("retrace.1"))?;

    // One extra page per subcommand, written as retrace-<name>.1
    for subcmd in cmd.get_subcommands() {
        let name = subcmd.get_name();
        if name == "help" {
            continue;
        }
        render_man(subcmd.clone(), &output_dir.join(format!("retrace-{name}.1")))?;
    }

    println!("\nTo view: man {}/retrace.1", output_dir.display());
    Ok(())
}

fn generate_completions(output_dir: &Path) -> Result<()> {
    create_output_dir(output_dir)?;

    let mut cmd = retrace::cli::Cli::command();
    for shell in [Shell::Bash, Shell::Elvish, Shell::Fish, Shell::PowerShell, Shell::Zsh] {
        let path = clap_complete::generate_to(shell, &mut cmd, "retrace", output_dir)
            .with_context(|| format!("Failed to write {shell} completions"))?;
        println!("✓ Generated: {}", path.display());
    }
    Ok(())
}
