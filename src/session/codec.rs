use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::error::SessionError;
use crate::config::SessionConfig;
use crate::models::Claims;

/// Turns raw bearer tokens into claims.
///
/// Without a secret the signature is not checked. Expiry is checked here,
/// with no leeway, against a caller-supplied `now`.
#[derive(Clone)]
pub struct TokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl TokenDecoder {
    /// Decodes claims without verifying the signature.
    pub fn unverified() -> Self {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        Self::relax(&mut validation);
        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    /// Decodes claims and verifies an HS256 signature made with `secret`.
    pub fn with_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        Self::relax(&mut validation);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        match &config.verify_secret {
            Some(secret) => Self::with_secret(secret),
            None => Self::unverified(),
        }
    }

    fn relax(validation: &mut Validation) {
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
    }

    /// Decodes the payload. Fails only when the token is structurally unusable.
    pub fn decode(&self, token: &str) -> Result<Claims, SessionError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }

    /// Decodes and rejects tokens whose `exp` is at or before `now`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, SessionError> {
        let claims = self.decode(token)?;
        if let Some(exp) = claims.exp {
            if now.timestamp() >= exp {
                return Err(SessionError::Expired { expired_at: exp });
            }
        } else {
            debug!("Token carries no exp claim; treating it as non-expiring");
        }
        Ok(claims)
    }
}
