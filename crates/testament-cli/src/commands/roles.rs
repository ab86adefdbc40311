//! Role reassignment and role lookup commands.

use super::parse_id;
use crate::cli::{IdArgs, RoleArgs};
use crate::error::Result;
use crate::identity::StaticIdentity;
use crate::output::Formatter;
use crate::LocalRegistry;
use testament_domain::traits::IdentityProvider;
use testament_domain::{Address, Clock};

/// Execute the set-heir command.
pub fn execute_set_heir<C: Clock>(
    args: RoleArgs,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_id(&args.id)?;
    let new_heir = Address::parse(&args.address)?;
    registry.update_heir(id, new_heir, identity.caller()?)?;

    formatter.format_testament(&registry.testament(id)?)
}

/// Execute the set-notary command.
pub fn execute_set_notary<C: Clock>(
    args: RoleArgs,
    registry: &mut LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_id(&args.id)?;
    let new_notary = Address::parse(&args.address)?;
    registry.update_notary(id, new_notary, identity.caller()?)?;

    formatter.format_testament(&registry.testament(id)?)
}

/// Execute the roles command.
pub fn execute_roles<C: Clock>(
    args: IdArgs,
    registry: &LocalRegistry<C>,
    identity: &StaticIdentity,
    formatter: &Formatter,
) -> Result<String> {
    let caller = identity.caller()?;
    let roles = registry.roles_of(parse_id(&args.id)?, &caller)?;
    formatter.format_roles(&caller, &roles)
}
