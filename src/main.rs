use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use retrace::cli::{Cli, Commands};
use retrace::output::{self, Verbosity};
use retrace::{RetraceContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "retrace=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RETRACE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    match cli.command {
        Commands::Completion { shell } => print_completions(shell, &mut Cli::command()),
        command => {
            let mut ctx = RetraceContext::new(cli.directory)?;
            dispatch(&mut ctx, command)?;
        }
    }

    Ok(())
}

fn dispatch(ctx: &mut RetraceContext, command: Commands) -> Result<()> {
    match command {
        Commands::Init { path } => commands::init::execute(ctx, path.as_deref()),
        Commands::Files { long } => commands::files::execute(ctx, long),
        Commands::Track { names } => commands::track::execute(ctx, &names),
        Commands::Check { name } => commands::check::execute(ctx, name.as_deref()),
        Commands::Backup(args) => commands::backup::execute(ctx, &args),
        Commands::Restore(args) => commands::restore::execute(ctx, &args),
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => commands::config::execute(ctx, key.as_deref(), value, unset, list),
        Commands::Shell => commands::shell::execute(ctx),
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
