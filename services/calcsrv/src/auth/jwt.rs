//! HS256 session tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tally_ledger::Principal;
use uuid::Uuid;

use crate::error::{CalcsrvError, Result};

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id (decimal string)
    pub sub: String,
    pub login: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id
    pub jti: Uuid,
}

impl Claims {
    pub fn principal(&self) -> Result<Principal> {
        self.sub
            .parse::<i64>()
            .map(Principal)
            .map_err(|_| CalcsrvError::Unauthenticated)
    }
}

/// Signing parameters
///
/// The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    ttl_hours: u64,
    issuer: String,
}

impl JwtConfig {
    pub fn new(secret: &[u8], ttl_hours: u64, issuer: &str) -> Self {
        Self {
            secret: secret.to_vec(),
            ttl_hours,
            issuer: issuer.to_string(),
        }
    }

    pub fn ttl_hours(&self) -> u64 {
        self.ttl_hours
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("ttl_hours", &self.ttl_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Issues and verifies tokens with a single shared secret
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl JwtManager {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            ttl: Duration::hours(config.ttl_hours.min(MAX_TOKEN_TTL_HOURS) as i64),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a token for `user_id` valid from now
    pub fn issue(&self, user_id: i64, login: &str) -> Result<String> {
        self.issue_at(user_id, login, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_at(&self, user_id: i64, login: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            login: login.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            jti: Uuid::new_v4(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Check signature, issuer and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("ttl_hours", &self.ttl.num_hours())
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
