//! Death confirmation and unlock commands.

use super::parse_id;
use crate::cli::IdArgs;
use crate::error::Result;
use crate::identity::StaticIdentity;
use crate::output::Formatter;
use crate::LocalRegistry;
use testament_domain::traits::IdentityProvider;
use testament_domain::Clock;

/// Execute the confirm-death command.
pub fn execute_confirm_death<C: Clock>(
    args: IdArgs,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_id(&args.id)?;
    registry.confirm_death(id, identity.caller()?)?;

    let testament = registry.testament(id)?;
    formatter.format_testament(&testament)
}

/// Execute the unlock command.
pub fn execute_unlock<C: Clock>(
    args: IdArgs,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_id(&args.id)?;
    let document_hash = registry.unlock_testament(id, identity.caller()?)?;
    formatter.format_document(&document_hash)
}
