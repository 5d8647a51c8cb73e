use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumina_core::{SessionId, UserId};

use crate::Subject;

/// Claims carried by a session token.
///
/// Enough for the edge filter to make a decision without touching the session
/// store; `sid` lets the guards fetch the authoritative session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Session the token was minted for.
    pub sid: SessionId,

    /// Role claim at issuance time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn subject(&self) -> Subject<'_> {
        Subject::Authenticated {
            user_id: self.sub,
            role: self.role.as_deref(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed or badly signed token: {0}")]
    Malformed(String),
}

/// Deterministically validate the time window of session claims.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Decodes and verifies a session token.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError>;
}

/// HMAC-SHA256 token codec.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window lives in our own claim names; see `validate_claims`.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            decoding: DecodingKey::from_secret(secret),
            encoding: EncodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims. Session issuance proper belongs to the session collaborator;
    /// this exists for dev tooling and tests.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, TokenValidationError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn claims(now: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims {
            sub: UserId::new(),
            sid: SessionId::new(),
            role: Some("WRITER".to_string()),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let c = claims(now, Duration::minutes(10));
        assert_eq!(validate_claims(&c, now), Ok(()));
        assert_eq!(
            validate_claims(&c, now + Duration::minutes(10)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, now - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        let bad = claims(now, Duration::zero());
        assert_eq!(validate_claims(&bad, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn hs256_round_trip_and_wrong_secret() {
        let now = Utc::now();
        let c = claims(now, Duration::minutes(10));
        let codec = Hs256JwtValidator::new("secret-a");
        let token = codec.issue(&c).unwrap();

        assert_eq!(codec.validate(&token, now).unwrap(), c);

        let other = Hs256JwtValidator::new("secret-b");
        assert!(matches!(
            other.validate(&token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected_after_decode() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(2), Duration::hours(1));
        let codec = Hs256JwtValidator::new("s");
        let token = codec.issue(&c).unwrap();
        assert_eq!(codec.validate(&token, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = Hs256JwtValidator::new("s");
        assert!(matches!(
            codec.validate("not.a.jwt", Utc::now()),
            Err(TokenValidationError::Malformed(_))
        ));
    }
}
