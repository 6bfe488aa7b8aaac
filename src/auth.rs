//! Password hashing and bearer tokens.
//!
//! Passwords are stored as bcrypt hashes. Access tokens are HS256 JWTs whose
//! subject is the username; they expire a fixed duration after issuance.

use crate::error::{AppError, AppResult};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TOKEN_TYPE: &str = "bearer";

// ============================================================================
// PASSWORDS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        let hashed = bcrypt::hash(password, self.cost).context("failed to hash password")?;
        Ok(hashed)
    }

    /// A malformed stored hash counts as a mismatch rather than an error, so
    /// login failures stay indistinguishable to the caller.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }

    /// Stand-in for `verify` when there is no stored hash to check against.
    /// Does a full bcrypt round at the configured cost and never matches, so
    /// an unknown username costs the same time as a wrong password.
    pub fn verify_missing(&self, password: &str) -> bool {
        if let Err(e) = bcrypt::hash(password, self.cost) {
            debug!(error = %e, "placeholder password hash failed");
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

// ============================================================================
// TOKENS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Body returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is dead the second its `exp` passes
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, username: &str) -> AppResult<AccessToken> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> AppResult<AccessToken> {
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign access token")?;

        Ok(AccessToken {
            access_token: token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Check signature and expiry; returns the username the token binds to
    pub fn verify(&self, token: &str) -> AppResult<String> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            AppError::Unauthorized
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims.sub)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
