pub mod cookie;
pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Which of the two token families a claim set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies the access/refresh pair. Stateless: nothing is stored
/// server-side, so a token stays valid until it expires.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.access_token_secret,
            &security.refresh_token_secret,
            Duration::minutes(security.access_token_minutes),
            Duration::days(security.refresh_token_days),
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(TokenKind::Access, user_id, Utc::now())
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(TokenKind::Refresh, user_id, Utc::now())
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify(TokenKind::Access, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify(TokenKind::Refresh, token)
    }

    fn issue_at(&self, kind: TokenKind, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_ttl),
        };
        let claims = Claims {
            sub: user_id,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<Uuid, TokenError> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        // Separate secrets already keep the families apart; the claim is a second check.
        if data.claims.kind != kind {
            return Err(TokenError::InvalidSignature);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("access-test", "refresh-test", Duration::minutes(30), Duration::days(7))
    }

    #[test]
    fn fresh_access_token_verifies() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue_access_token(user_id).unwrap();
        assert_eq!(tokens.verify_access_token(&token), Ok(user_id));
    }

    #[test]
    fn access_token_expires_after_lifetime() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now() - Duration::minutes(31);
        let token = tokens.issue_at(TokenKind::Access, user_id, issued).unwrap();
        assert_eq!(tokens.verify_access_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn access_token_still_valid_just_before_expiry() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now() - Duration::minutes(29);
        let token = tokens.issue_at(TokenKind::Access, user_id, issued).unwrap();
        assert_eq!(tokens.verify_access_token(&token), Ok(user_id));
    }

    #[test]
    fn refresh_token_lasts_seven_days() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let six_days = tokens
            .issue_at(TokenKind::Refresh, user_id, Utc::now() - Duration::days(6))
            .unwrap();
        let eight_days = tokens
            .issue_at(TokenKind::Refresh, user_id, Utc::now() - Duration::days(8))
            .unwrap();
        assert_eq!(tokens.verify_refresh_token(&six_days), Ok(user_id));
        assert_eq!(tokens.verify_refresh_token(&eight_days), Err(TokenError::Expired));
    }

    #[test]
    fn token_families_do_not_cross() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let access = tokens.issue_access_token(user_id).unwrap();
        let refresh = tokens.issue_refresh_token(user_id).unwrap();
        assert_eq!(tokens.verify_refresh_token(&access), Err(TokenError::InvalidSignature));
        assert_eq!(tokens.verify_access_token(&refresh), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let other = TokenService::new("someone-else", "x", Duration::minutes(30), Duration::days(7));
        let token = other.issue_access_token(Uuid::new_v4()).unwrap();
        assert_eq!(service().verify_access_token(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().verify_access_token("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(service().verify_access_token(""), Err(TokenError::Malformed));
    }
}
