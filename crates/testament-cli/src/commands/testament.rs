//! Create, show and list commands.

use super::parse_id;
use crate::cli::{CreateArgs, IdArgs};
use crate::error::Result;
use crate::identity::StaticIdentity;
use crate::output::Formatter;
use crate::LocalRegistry;
use testament_domain::traits::IdentityProvider;
use testament_domain::{Address, Clock};

/// Execute the create command.
pub fn execute_create<C: Clock>(
    args: CreateArgs,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let owner = identity.caller()?;
    let heir = Address::parse(&args.heir)?;
    let notary = Address::parse(&args.notary)?;

    let id = registry.create(heir, notary, args.document_hash, args.delay, owner)?;
    let unlock_time = registry.unlock_time(id)?;

    formatter.format_created(&id, unlock_time)
}

/// Execute the show command.
pub fn execute_show<C: Clock>(
    args: IdArgs,
    registry: &LocalRegistry<C>,
    formatter: &Formatter,
) -> Result<String> {
    let testament = registry.testament(parse_id(&args.id)?)?;
    formatter.format_testament(&testament)
}

/// Execute the list command.
pub fn execute_list<C: Clock>(registry: &LocalRegistry<C>, formatter: &Formatter) -> Result<String> {
    let ids = registry.list()?;
    formatter.format_ids(&ids)
}
