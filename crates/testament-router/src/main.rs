//! Testament Router CLI
//!
//! Starts the HTTP server hosting the testament registry.

use std::env;
use std::process;
use testament_router::{config::RouterConfig, start_server, RouterError};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), RouterError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        RouterConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: testament-router --config <path-to-config.toml>");
        eprintln!();
        RouterConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Testament Router - time-locked document release service");
    println!();
    println!("USAGE:");
    println!("    testament-router --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - database_path: SQLite file (default: testaments.db)");
    println!("    - jwt_secret: Secret key for identity tokens");
    println!("    - token_expiry_secs: Token expiry in seconds (default: 3600)");
    println!("    - log_filter: Log filter when RUST_LOG is unset (default: info)");
    println!();
}
