//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Testament CLI - Manage time-locked testaments in a local registry.
#[derive(Debug, Parser)]
#[command(name = "testament")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// SQLite database holding the registry
    #[arg(long, global = true, env = "TESTAMENT_DB")]
    pub db: Option<String>,

    /// Address to act as
    #[arg(long = "as", global = true, env = "TESTAMENT_CALLER")]
    pub caller: Option<String>,

    /// Log registry activity to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a testament owned by the acting address
    Create(CreateArgs),

    /// Show one testament
    Show(IdArgs),

    /// List testament ids
    List,

    /// Confirm the testator's death (notary)
    ConfirmDeath(IdArgs),

    /// Unlock the testament and print the document hash (heir)
    Unlock(IdArgs),

    /// Reassign the heir (owner)
    SetHeir(RoleArgs),

    /// Reassign the notary (owner)
    SetNotary(RoleArgs),

    /// Show the roles the acting address holds
    Roles(IdArgs),

    /// Print a testament's event log
    Events(EventsArgs),

    /// Issue an identity token for the router
    Token(TokenArgs),
}

/// Arguments for the create command.
#[derive(Debug, Parser)]
pub struct CreateArgs {
    /// Heir address
    #[arg(long)]
    pub heir: String,

    /// Notary address
    #[arg(long)]
    pub notary: String,

    /// Content reference of the document
    #[arg(long = "hash")]
    pub document_hash: String,

    /// Waiting period in seconds, counted from creation
    #[arg(short, long, default_value = "86400")]
    pub delay: u64,
}

/// Arguments naming a single testament.
#[derive(Debug, Parser)]
pub struct IdArgs {
    /// Testament id
    pub id: String,
}

/// Arguments for the set-heir and set-notary commands.
#[derive(Debug, Parser)]
pub struct RoleArgs {
    /// Testament id
    pub id: String,

    /// New address for the role
    pub address: String,
}

/// Arguments for the events command.
#[derive(Debug, Parser)]
pub struct EventsArgs {
    /// Testament id
    pub id: String,

    /// Only show events after this sequence number
    #[arg(short, long, default_value = "0")]
    pub after: u64,
}

/// Arguments for the token command.
#[derive(Debug, Parser)]
pub struct TokenArgs {
    /// Address to issue the token for (defaults to --as)
    pub address: Option<String>,

    /// Token lifetime in seconds (defaults to the configured expiry)
    #[arg(short, long)]
    pub expiry: Option<u64>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_command() {
        let cli = Cli::parse_from([
            "testament",
            "--as",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "create",
            "--heir",
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "--notary",
            "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
            "--hash",
            "QmHash123456789",
        ]);
        assert_eq!(
            cli.caller.as_deref(),
            Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.document_hash, "QmHash123456789");
                assert_eq!(args.delay, 86_400);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "testament",
            "events",
            "some-id",
            "--after",
            "2",
            "--format",
            "json",
            "-vv",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Events(args) => assert_eq!(args.after, 2),
            _ => panic!("Expected Events command"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["testament"]).is_err());
    }
}
