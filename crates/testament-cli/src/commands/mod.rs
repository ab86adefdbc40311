//! Command implementations.
//!
//! Each command returns the text to print so callers decide where it goes.

pub mod events;
pub mod lifecycle;
pub mod roles;
pub mod testament;
pub mod token;

pub use self::events::execute_events;
pub use self::lifecycle::{execute_confirm_death, execute_unlock};
pub use self::roles::{execute_roles, execute_set_heir, execute_set_notary};
pub use self::testament::{execute_create, execute_list, execute_show};
pub use self::token::execute_token;

use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::identity::StaticIdentity;
use crate::output::Formatter;
use crate::LocalRegistry;
use testament_domain::{Clock, TestamentId};

/// Execute a command against an open registry.
pub fn execute<C: Clock>(
    command: Command,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    match command {
        Command::Create(args) => execute_create(args, registry, identity, formatter),
        Command::Show(args) => execute_show(args, registry, formatter),
        Command::List => execute_list(registry, formatter),
        Command::ConfirmDeath(args) => execute_confirm_death(args, registry, identity, formatter),
        Command::Unlock(args) => execute_unlock(args, registry, identity, formatter),
        Command::SetHeir(args) => execute_set_heir(args, registry, identity, formatter),
        Command::SetNotary(args) => execute_set_notary(args, registry, identity, formatter),
        Command::Roles(args) => execute_roles(args, registry, identity, formatter),
        Command::Events(args) => execute_events(args, registry, formatter),
        Command::Token(args) => execute_token(args, identity, config, formatter),
    }
}

fn parse_id(id: &str) -> Result<TestamentId> {
    Ok(TestamentId::from_string(id.trim())?)
}
