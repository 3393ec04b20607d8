//! lsbranch CLI - list the checked-out branches of local git clones

mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use lsbranch_core::{ConfigStore, GitSettings, GitStatusResolver};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AddArgs, AlreadyReported, CommandContext, LsArgs};

/// LSBranch is a simple tool for listing the active branches in git clones.
#[derive(Parser, Debug)]
#[command(name = "lsbranch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the config file path. Defaults to ~/.lsbranchrc.json
    #[arg(short, long, global = true, value_name = "PATH", env = "LSBRANCH_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Path to git executable (overrides env)
    #[arg(long, global = true, env = "LSBRANCH_GIT_PATH")]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List branches
    Ls(LsArgs),

    /// Add a repo
    Add(AddArgs),

    /// Show the config file location
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so `ls --json` stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<AlreadyReported>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", format!("An unexpected error occurred: {:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = ConfigStore::new(cli.config.clone())?;
    let settings = GitSettings::load_with_overrides(cli.git_path.clone());

    if cli.verbose {
        tracing::info!(
            config = %store.path().display(),
            git_path = %settings.git_path,
            "Configuration loaded"
        );
    }

    let ctx = CommandContext {
        store,
        resolver: Arc::new(GitStatusResolver::from_settings(&settings)),
    };

    match cli.command {
        Some(Commands::Ls(args)) => args.execute(&ctx).await?,
        Some(Commands::Add(args)) => args.execute(&ctx).await?,
        Some(Commands::Config) => {
            println!("Config file: {}", ctx.store.path().display());
            if ctx.store.path().exists() {
                println!("  (exists)");
            } else {
                println!("  (not found)");
            }
            println!("Git executable: {}", settings.git_path);
        }
        None => {
            println!("LSBranch - list the active branches in git clones");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
