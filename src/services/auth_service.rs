//! Bearer token issuing and verification (HS256 JWTs whose subject is the user id).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Failures raised while issuing or checking a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, format or claims are invalid.
    #[error("invalid token")]
    Invalid,
    /// The token is past its expiry.
    #[error("token expired")]
    Expired,
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    exp: u64,
    iat: u64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Build a service signing with `secret`; issued tokens live for `ttl`.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for `user_id`, valid from `now` for the configured lifetime.
    pub fn issue(&self, user_id: Uuid, now: SystemTime) -> Result<String, TokenError> {
        let iat = now
            .duration_since(UNIX_EPOCH)
            .map_err(|err| TokenError::Signing(err.to_string()))?
            .as_secs();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: iat + self.ttl.as_secs(),
            iat,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Verify `token` and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &Validation::default()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!(error = %err, "rejecting bearer token");
                    TokenError::Invalid
                }
            },
        )?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
