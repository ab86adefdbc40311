//! Caller identity from bearer tokens.
//!
//! Tokens are HS256 JWTs whose subject is the caller's address. Issuing them
//! is the operator's job (the CLI holds the same secret); the router only
//! validates and hands the resulting address to the registry.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use testament_domain::traits::IdentityProvider;
use testament_domain::Address;
use thiserror::Error;

/// Identity resolution error
#[derive(Debug, Error)]
pub enum IdentityError {
    /// JWT encoding failed
    #[error("Failed to encode JWT: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    /// No bearer token on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// Token expired
    #[error("Identity token expired")]
    TokenExpired,

    /// Invalid token
    #[error("Invalid identity token")]
    InvalidToken,
}

/// JWT claims for identity tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Caller address
    pub sub: String,

    /// Token expiration timestamp (Unix epoch)
    pub exp: u64,

    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Issues and validates identity tokens
pub struct IdentityTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_secs: u64,
}

impl IdentityTokens {
    /// Create a token authority with the given JWT secret and expiry
    pub fn new(jwt_secret: &str, token_expiry_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
        }
    }

    /// Issue a token asserting `address` as the caller
    pub fn issue(&self, address: &Address) -> Result<String, IdentityError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let claims = IdentityClaims {
            sub: address.to_string(),
            exp: now + self.token_expiry_secs,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and extract the caller address
    pub fn validate(&self, token: &str) -> Result<Address, IdentityError> {
        let validation = Validation::default();
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                _ => IdentityError::InvalidToken,
            })?;

        Address::parse(&token_data.claims.sub).map_err(|_| IdentityError::InvalidToken)
    }
}

/// Resolves the caller of one HTTP request from its `Authorization` header
pub struct BearerIdentity<'a> {
    tokens: &'a IdentityTokens,
    headers: &'a HeaderMap,
}

impl<'a> BearerIdentity<'a> {
    /// Bind the token authority to a request's headers
    pub fn new(tokens: &'a IdentityTokens, headers: &'a HeaderMap) -> Self {
        Self { tokens, headers }
    }
}

impl IdentityProvider for BearerIdentity<'_> {
    type Error = IdentityError;

    fn caller(&self) -> Result<Address, IdentityError> {
        let token = self
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(IdentityError::MissingToken)?;

        self.tokens.validate(token.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn alice() -> Address {
        Address::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap()
    }

    #[test]
    fn test_issue_and_validate_token() {
        let tokens = IdentityTokens::new("test-secret", 3600);
        let token = tokens.issue(&alice()).unwrap();

        assert_eq!(tokens.validate(&token).unwrap(), alice());
    }

    #[test]
    fn test_expired_token() {
        let tokens = IdentityTokens::new("test-secret", 3600);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = IdentityClaims {
            sub: alice().to_string(),
            exp: now - 100, // Expired 100 seconds ago
            iat: now - 200,
        };

        let token = encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();
        assert!(matches!(
            tokens.validate(&token),
            Err(IdentityError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let tokens = IdentityTokens::new("test-secret", 3600);
        assert!(matches!(
            tokens.validate("invalid-token"),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = IdentityTokens::new("secret1", 3600);
        let verifier = IdentityTokens::new("secret2", 3600);

        let token = issuer.issue(&alice()).unwrap();
        assert!(matches!(
            verifier.validate(&token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_subject_must_be_an_address() {
        let tokens = IdentityTokens::new("test-secret", 3600);
        let claims = IdentityClaims {
            sub: "alice".to_string(),
            exp: u64::MAX / 2,
            iat: 0,
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();
        assert!(matches!(
            tokens.validate(&token),
            Err(IdentityError::InvalidToken)
        ));
    }

    #[test]
    fn test_bearer_identity() {
        let tokens = IdentityTokens::new("test-secret", 3600);
        let token = tokens.issue(&alice()).unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            BearerIdentity::new(&tokens, &headers).caller(),
            Err(IdentityError::MissingToken)
        ));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(BearerIdentity::new(&tokens, &headers).caller().unwrap(), alice());
    }
}
