/**
 * Identity Gate
 *
 * Verifies the bearer token presented when a collaboration socket is opened
 * and turns it into an optional user identity. An unusable token is not an
 * error at this layer: the connection simply proceeds without an identity and
 * each later operation is authorized on its own.
 */

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::{SharedError, UserId};

/// Lifetime of tokens minted by [`IdentityGate::create_token`]
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Reasons a token does not yield an identity
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("invalid subject in token: {0}")]
    Subject(#[from] SharedError),
}

/// Verifies (and, for tooling and tests, mints) HS256 session tokens
#[derive(Clone)]
pub struct IdentityGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate").finish_non_exhaustive()
    }
}

impl IdentityGate {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Create a token for a user, valid for [`DEFAULT_TOKEN_TTL_DAYS`]
    pub fn create_token(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue(user_id, None, Duration::days(DEFAULT_TOKEN_TTL_DAYS))
    }

    /// Create a token with an explicit lifetime (negative lifetimes yield expired tokens)
    pub fn issue(
        &self,
        user_id: UserId,
        email: Option<String>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email,
            exp: (now + ttl).timestamp().max(0) as u64,
            iat: now.timestamp().max(0) as u64,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Resolve a verified user id from a token
    pub fn user_id_from_token(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.verify_token(token)?;
        Ok(UserId::parse(&claims.sub)?)
    }

    /// Identity for a connection; any failure means "no identity"
    pub fn identify(&self, token: Option<&str>) -> Option<UserId> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        match self.user_id_from_token(token) {
            Ok(user_id) => {
                tracing::debug!("[Auth] Connection authenticated as {}", user_id);
                Some(user_id)
            }
            Err(e) => {
                tracing::debug!("[Auth] Ignoring unusable token: {}", e);
                None
            }
        }
    }
}
