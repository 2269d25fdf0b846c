//! JWT issuance and validation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::warn;
use uuid::Uuid;

use super::claims::{Claims, TokenUse};
use super::config::{AuthConfig, ConfigValidationError};
use super::error::AuthError;

/// Issues and validates HS256 access/refresh tokens for a subject.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer from a resolved secret and token lifetimes.
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Create an issuer from a validated configuration.
    /// Resolves `env:VAR_NAME` syntax in the secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let secret = config
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        Ok(Self::new(
            &secret,
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        ))
    }

    /// Lifetime of issued access tokens, in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Issue an access token for a subject.
    ///
    /// `fresh` marks a token minted directly from a password check, as
    /// opposed to one derived through a refresh exchange.
    pub fn issue_access(&self, subject: &str, fresh: bool) -> Result<String, AuthError> {
        self.issue(subject, TokenUse::Access, self.access_ttl_secs, fresh)
    }

    /// Issue a refresh token for a subject.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, TokenUse::Refresh, self.refresh_ttl_secs, false)
    }

    fn issue(
        &self,
        subject: &str,
        token_use: TokenUse,
        ttl_secs: i64,
        fresh: bool,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp: now + ttl_secs,
            iat: now,
            jti: Uuid::new_v4(),
            token_use,
            fresh,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Validate a token and check it is of the expected kind.
    pub fn decode(&self, token: &str, expected: TokenUse) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear(); // Allow missing iss/aud

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = token_data.claims;
        if claims.token_use != expected {
            return Err(AuthError::InvalidToken("wrong token type".to_string()));
        }

        Ok(claims)
    }
}
