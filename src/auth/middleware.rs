//! Authentication middleware.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::claims::{Claims, TokenUse};
use super::error::AuthError;
use super::tokens::TokenIssuer;

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authenticated user extracted from the request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Access token claims.
    pub claims: Claims,
}

impl CurrentUser {
    /// The authenticated subject (email).
    pub fn subject(&self) -> &str {
        self.claims.subject()
    }

    /// Whether the access token came straight from a password check.
    pub fn is_fresh(&self) -> bool {
        self.claims.fresh
    }
}

/// Extract authentication from request.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication middleware.
///
/// Validates the `Authorization: Bearer <token>` header as an access token
/// and injects [`CurrentUser`] into request extensions.
pub async fn auth_middleware(
    State(issuer): State<TokenIssuer>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = bearer_token_from_header(header)?;
    let claims = issuer.decode(token, TokenUse::Access)?;

    req.extensions_mut().insert(CurrentUser { claims });

    Ok(next.run(req).await)
}
