//! Testament CLI library.
//!
//! Drives a testament registry stored in a local SQLite file, acting as
//! whichever address the operator names with `--as`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use identity::StaticIdentity;
pub use output::Formatter;

use testament_domain::{Clock, SystemClock, TestamentRegistry};
use testament_store::SqliteStore;
use tracing::debug;

/// Registry over a local database
pub type LocalRegistry<C> = TestamentRegistry<SqliteStore, C>;

/// Open (or create) the registry database at `path`.
pub fn open_registry<C: Clock>(path: &str, clock: C) -> Result<LocalRegistry<C>> {
    debug!(database = %path, "Opening registry");
    let store = SqliteStore::new(path)?;
    Ok(TestamentRegistry::new(store, clock))
}

/// Run one parsed command line with the given configuration.
///
/// Flags on the command line take precedence over the configuration file.
pub fn run(cli: Cli, config: &Config) -> Result<String> {
    let format = cli.format.map(Into::into).unwrap_or(config.format);
    let formatter = Formatter::new(format, !cli.no_color && config.color);
    let identity = StaticIdentity::from_arg(cli.caller.as_deref())?;

    match cli.command {
        // Issuing a token never needs the database
        Command::Token(args) => commands::execute_token(args, &identity, config, &formatter),
        command => {
            let database = cli.db.as_deref().unwrap_or(&config.database_path);
            let mut registry = open_registry(database, SystemClock)?;
            commands::execute(command, &mut registry, &identity, config, &formatter)
        }
    }
}
