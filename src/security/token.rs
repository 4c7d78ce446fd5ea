//! Signed session tokens.
//!
//! Tokens are compact HS256 JWTs. Verification is stateless: the issued
//! token list in storage is an audit trail and is never consulted here.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{SecurityConfig, TokenTtlConfig};
use crate::models::{Role, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Who a token is minted for.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Token lifetime per role.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtlPolicy {
    user: Duration,
    admin: Duration,
}

impl TokenTtlPolicy {
    #[must_use]
    pub fn from_config(config: &TokenTtlConfig) -> Self {
        let secs = |v: u64| {
            Duration::seconds(i64::try_from(v).unwrap_or(i64::MAX).min(i64::MAX / 1000))
        };
        Self {
            user: secs(config.user_secs),
            admin: secs(config.admin_secs),
        }
    }

    #[must_use]
    pub const fn ttl_for(&self, role: Role) -> Duration {
        match role {
            Role::User => self.user,
            Role::Admin => self.admin,
        }
    }
}

impl Default for TokenTtlPolicy {
    fn default() -> Self {
        Self::from_config(&TokenTtlConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.claims.iat, 0).unwrap_or_default()
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.claims.exp, 0).unwrap_or_default()
    }

    #[must_use]
    pub fn hash(&self) -> String {
        hash_token(&self.token)
    }
}

/// SHA-256 hex digest. The only form in which tokens are persisted.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TokenTtlPolicy,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &[u8], ttl: TokenTtlPolicy) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            TokenTtlPolicy::from_config(&config.token_ttl),
        )
    }

    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl.ttl_for(identity.role)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Fails closed on any signature, format or expiry problem.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes!!";

    fn identity(role: Role) -> Identity {
        Identity {
            id: 42,
            username: "alice".to_string(),
            role,
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, TokenTtlPolicy::default())
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let issued = issuer.issue(&identity(Role::User), Utc::now()).unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_ttl_depends_on_role() {
        let issuer = issuer();
        let now = Utc::now();

        let user = issuer.issue(&identity(Role::User), now).unwrap();
        assert_eq!(user.claims.exp - user.claims.iat, 7 * 24 * 60 * 60);

        let admin = issuer.issue(&identity(Role::Admin), now).unwrap();
        assert_eq!(admin.claims.exp - admin.claims.iat, 90 * 24 * 60 * 60);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let issuer = issuer();
        let now = Utc::now();
        let a = issuer.issue(&identity(Role::User), now).unwrap();
        let b = issuer.issue(&identity(Role::User), now).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let issued = issuer
            .issue(&identity(Role::User), Utc::now() - Duration::days(8))
            .unwrap();
        assert_eq!(issuer.verify(&issued.token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = issuer().issue(&identity(Role::Admin), Utc::now()).unwrap();
        let other = TokenIssuer::new(b"another-secret-that-is-32-bytes-long", TokenTtlPolicy::default());
        assert_eq!(other.verify(&issued.token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = issuer();
        let issued = issuer.issue(&identity(Role::User), Utc::now()).unwrap();

        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let replacement = if payload.as_bytes()[5] == b'A' { "B" } else { "A" };
        payload.replace_range(5..6, replacement);
        let tampered = parts.join(".");

        assert_eq!(issuer.verify(&tampered), Err(TokenError::InvalidToken));
        assert_eq!(issuer.verify("not.a.token"), Err(TokenError::InvalidToken));
        assert_eq!(issuer.verify(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_token_hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("abc"));
        assert_ne!(hash, hash_token("abd"));
    }
}
