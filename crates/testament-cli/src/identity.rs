//! The acting address given on the command line.

use crate::error::{CliError, Result};
use testament_domain::traits::IdentityProvider;
use testament_domain::Address;

/// Caller identity fixed for one CLI invocation
///
/// The operator is trusted to act as whoever they name; nothing is signed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIdentity(Option<Address>);

impl StaticIdentity {
    /// Parse the `--as` value, if any
    pub fn from_arg(value: Option<&str>) -> Result<Self> {
        let address = value.map(Address::parse).transpose()?;
        Ok(Self(address))
    }

    /// Act as a known address
    pub fn acting_as(address: Address) -> Self {
        Self(Some(address))
    }
}

impl IdentityProvider for StaticIdentity {
    type Error = CliError;

    fn caller(&self) -> Result<Address> {
        self.0.ok_or(CliError::NoCaller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_caller() {
        let identity = StaticIdentity::from_arg(None).unwrap();
        assert!(matches!(identity.caller(), Err(CliError::NoCaller)));
    }

    #[test]
    fn test_caller_is_normalized() {
        let identity =
            StaticIdentity::from_arg(Some("0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266")).unwrap();
        assert_eq!(
            identity.caller().unwrap().to_string(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_malformed_caller() {
        assert!(matches!(
            StaticIdentity::from_arg(Some("alice")),
            Err(CliError::Testament(_))
        ));
    }
}
