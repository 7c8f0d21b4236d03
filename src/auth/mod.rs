use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AppConfig;

/// Session claims: the caller-supplied identity object plus issue and expiry times.
///
/// The identity is flattened into the token body, so a login payload of
/// `{"email": "a@b.com"}` produces claims `{"email": "a@b.com", "iat": .., "exp": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Map<String, Value>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("Session payload must be a JSON object")]
    InvalidPayload,
    #[error("JWT generation error: {0}")]
    Generation(String),
    #[error("Invalid JWT token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies signed, time-limited session tokens.
///
/// Stateless beyond the shared secret: there is no revocation list, so a
/// token stays valid until its `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock-skew grace period
        validation.leeway = 0;
        // Identity payloads are caller-defined and may carry an `aud` key
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        Self::new(
            &config.security.jwt_secret,
            Duration::seconds(config.security.jwt_expiry_secs),
        )
    }

    /// Sign `payload` as-is with an expiry of `ttl` from now.
    pub fn issue(&self, payload: Value) -> Result<String, TokenError> {
        let Value::Object(mut identity) = payload else {
            return Err(TokenError::InvalidPayload);
        };
        identity.remove("iat");
        identity.remove("exp");

        let now = Utc::now();
        let claims = Claims {
            identity,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Decode `token`, failing on a bad signature, malformed input, or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
