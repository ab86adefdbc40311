//! Token command implementation.

use crate::cli::TokenArgs;
use crate::config::Config;
use crate::error::Result;
use crate::identity::StaticIdentity;
use crate::output::Formatter;
use testament_domain::traits::IdentityProvider;
use testament_domain::Address;
use testament_router::identity::IdentityTokens;

/// Execute the token command.
///
/// Signs with the configured secret, which must match the router's.
pub fn execute_token(
    args: TokenArgs,
    identity: &StaticIdentity,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let address = match args.address {
        Some(address) => Address::parse(&address)?,
        None => identity.caller()?,
    };
    let expiry = args.expiry.unwrap_or(config.token_expiry_secs);

    let tokens = IdentityTokens::new(config.jwt_secret()?, expiry);
    let token = tokens.issue(&address)?;
    formatter.format_token(&address, &token)
}
