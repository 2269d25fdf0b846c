//! Core business logic for the authentication flow.

use tracing::{info, instrument};

use crate::user::{User, UserRepository};

use super::claims::{Claims, TokenUse};
use super::error::AuthError;
use super::revocation::RevocationRepository;
use super::tokens::TokenIssuer;

/// Token pair issued on a successful login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

/// Orchestrates login, refresh, logout and identity lookup.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    issuer: TokenIssuer,
    revoked: RevocationRepository,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(users: UserRepository, issuer: TokenIssuer, revoked: RevocationRepository) -> Self {
        Self {
            users,
            issuer,
            revoked,
        }
    }

    /// Authenticate with email and password and issue a token pair.
    ///
    /// An unknown email, a user without a stored password, and a wrong
    /// password all fail the same way so the endpoint cannot be used to
    /// probe which accounts exist.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        let user = self.users.get_by_email(username).await?;

        let user = match user {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        if !crate::user::verify_password(password, hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_pair(&user.email, true)?;
        info!(user_id = %user.id, "User logged in");

        Ok(tokens)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Refresh tokens are single-use: the presented token is revoked and a
    /// new one issued alongside the access token. The new access token is
    /// not fresh.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, AuthError> {
        let claims = self.issuer.decode(refresh_token, TokenUse::Refresh)?;

        if self.revoked.is_revoked(claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        // The subject may have been deleted since the token was issued.
        if self.users.get_by_email(&claims.sub).await?.is_none() {
            return Err(AuthError::UnknownSubject);
        }

        self.revoked
            .revoke(claims.jti, &claims.sub, claims.exp)
            .await?;

        let tokens = self.issue_pair(&claims.sub, false)?;
        info!(subject = %claims.sub, "Refreshed session tokens");

        Ok(tokens)
    }

    /// End a session by revoking its refresh token.
    ///
    /// Idempotent, and deliberately forgiving: a token that is already
    /// expired or malformed has nothing left to revoke, so logout still
    /// succeeds from the client's point of view.
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = match self.issuer.decode(refresh_token, TokenUse::Refresh) {
            Ok(claims) => claims,
            Err(AuthError::Database(e)) => return Err(AuthError::Database(e)),
            Err(_) => return Ok(()),
        };

        self.revoked
            .revoke(claims.jti, &claims.sub, claims.exp)
            .await?;
        info!(subject = %claims.sub, "User logged out");

        Ok(())
    }

    /// Resolve the authenticated caller to their account record.
    #[instrument(skip(self, claims), fields(subject = %claims.sub))]
    pub async fn current_user(&self, claims: &Claims) -> Result<User, AuthError> {
        self.users
            .get_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)
    }

    fn issue_pair(&self, subject: &str, fresh: bool) -> Result<IssuedTokens, AuthError> {
        Ok(IssuedTokens {
            access_token: self.issuer.issue_access(subject, fresh)?,
            refresh_token: self.issuer.issue_refresh(subject)?,
            expires_in: self.issuer.access_ttl_secs(),
        })
    }
}
