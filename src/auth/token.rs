use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure kinds of token verification. They stay distinguishable here so
/// they can be logged, but the HTTP boundary collapses all of them into a
/// single 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    ExpiredToken,
    #[error("token is malformed: {0}")]
    MalformedToken(String),
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user id, as a decimal string.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Key material for signing and verifying tokens.
///
/// Kept separate from [`TokenService`] so the verification key can be
/// swapped without touching any call site.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and verifies HS256-signed, time-limited identity tokens.
///
/// Tokens are stateless: nothing is stored server side and a token stays
/// valid for its whole lifetime unless the signing key changes.
#[derive(Clone)]
pub struct TokenService {
    keys: TokenKeys,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(keys: TokenKeys, lifetime: Duration) -> Self {
        Self { keys, lifetime }
    }

    pub fn issue(&self, subject: i32) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: i32, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies the signature first, then checks expiry against `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i32, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock; `exp` is still required.
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken(e.to_string()),
            })?;

        if now.timestamp() > claims.exp {
            return Err(TokenError::ExpiredToken);
        }

        claims
            .sub
            .parse::<i32>()
            .map_err(|_| TokenError::MalformedToken("subject is not a user id".into()))
    }
}
