//! Testament CLI - Command-line interface for time-locked testaments.

use clap::Parser;
use testament_cli::{Cli, Config};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> testament_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("testament_domain={level},testament_cli={level}"))
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load or create config
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };

    let output = testament_cli::run(cli, &config)?;
    println!("{}", output);

    Ok(())
}
