use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fieldsync::cli::args::{Cli, Commands};
use fieldsync::cli::commands::{self, Context};
use fieldsync::config::{Config, Paths};
use fieldsync::error::FieldSyncError;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "FIELDSYNC_LOG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FieldSyncError> {
    let cli = Cli::parse();
    let paths = match &cli.data_dir {
        Some(dir) => Paths::with_root(dir.clone()),
        None => Paths::new()?,
    };
    let config = Config::load_from_path(&paths.config_file)?;

    init_logging(cli.verbose, &config.general.log_level);

    let format = cli.output.unwrap_or(config.general.default_output);
    let ctx = Context::open(&paths, &config, cli.offline).await?;

    let output = match cli.command {
        Commands::Status => commands::status(&ctx, format)?,
        Commands::Add { kind, payload } => commands::add(&ctx, kind, payload.as_deref(), format)?,
        Commands::List { limit } => commands::list(&ctx, limit, format)?,
        Commands::Run => commands::run(&ctx, format).await?,
        Commands::Remove { id } => commands::remove(&ctx, &id, format)?,
        Commands::Clear { force } => commands::clear(&ctx, force, format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn init_logging(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| match verbose {
        0 => EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
