//! HS256 access/refresh token issuance and validation.

use std::fmt;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::AuthError;

/// HMAC-SHA256 keys shorter than the digest are rejected.
pub const MIN_SECRET_BYTES: usize = 32;

/// Lookup the token layer needs to confirm an access token's subject still exists.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, username: &str) -> anyhow::Result<bool>;
}

/// Value of the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Tokens handed out on login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and verifies tokens with a single static shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::WeakSecret {
                min: MIN_SECRET_BYTES,
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a token of the given kind for `username`
    pub fn issue(&self, username: &str, kind: TokenKind) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl(kind)).unix_timestamp(),
            kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Issue an access token and a refresh token for `username`
    pub fn issue_pair(&self, username: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            token: self.issue(username, TokenKind::Access)?,
            refresh_token: self.issue(username, TokenKind::Refresh)?,
        })
    }

    /// Verify signature and expiry, returning the claims of either kind
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    fn decode_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.decode(token)?;
        if claims.kind != expected {
            return Err(AuthError::WrongKind { expected });
        }
        Ok(claims)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_kind(token, TokenKind::Refresh)
    }

    /// Verify an access token and confirm its subject is still a known user
    pub async fn validate_access(
        &self,
        token: &str,
        users: &dyn UserDirectory,
    ) -> Result<Claims, AuthError> {
        let claims = self.decode_kind(token, TokenKind::Access)?;
        if !users.user_exists(&claims.sub).await? {
            return Err(AuthError::UnknownSubject);
        }
        Ok(claims)
    }
}
