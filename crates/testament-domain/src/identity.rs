//! Identity module - the addresses that hold testament roles

use crate::error::TestamentError;
use std::fmt;
use std::str::FromStr;

/// Number of bytes in an address
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address
///
/// Addresses arrive already authenticated by the caller's identity provider;
/// this type only normalizes and compares them. Parsing accepts an optional
/// `0x` prefix and any hex case, so two spellings of the same account are
/// always equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address, used as the "unset" identity
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an address from its hex representation
    ///
    /// # Examples
    ///
    /// ```
    /// use testament_domain::Address;
    ///
    /// let a = Address::parse("0xAbCdEf0123456789aBcDeF0123456789AbCdEf01").unwrap();
    /// let b = Address::parse("abcdef0123456789abcdef0123456789abcdef01").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
    /// ```
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the value is not 40 hex digits
    pub fn parse(value: &str) -> Result<Self, TestamentError> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(TestamentError::InvalidArgument(format!(
                "Invalid address '{}': expected {} hex digits",
                value,
                ADDRESS_LEN * 2
            )));
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            TestamentError::InvalidArgument(format!("Invalid address '{}': {}", value, e))
        })?;

        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Check whether this is the zero (unset) identity
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = TestamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A role that an address can hold on a testament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The creator of the testament (owner)
    Testator,

    /// Attests the testator's death
    Notary,

    /// Receives the document reference once unlocked
    Heir,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Testator => "testator",
            Role::Notary => "notary",
            Role::Heir => "heir",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: display then parse preserves the address
        #[test]
        fn test_display_parse_roundtrip(bytes: [u8; 20]) {
            let addr = Address::from_bytes(bytes);
            prop_assert_eq!(Address::parse(&addr.to_string()).unwrap(), addr);
        }

        /// Property: comparison ignores hex case
        #[test]
        fn test_case_insensitive_equality(bytes: [u8; 20]) {
            let addr = Address::from_bytes(bytes);
            let shouted = addr.to_string()[2..].to_uppercase();
            prop_assert_eq!(Address::parse(&shouted).unwrap(), addr);
        }
    }
}
