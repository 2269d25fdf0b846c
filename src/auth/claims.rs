//! JWT claims.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Short-lived token presented on API calls.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Token identifier, referenced by the revocation list.
    pub jti: Uuid,

    /// Access or refresh.
    pub token_use: TokenUse,

    /// Whether this access token came directly from a password check
    /// rather than from a refresh exchange.
    #[serde(default)]
    pub fresh: bool,
}

impl Claims {
    /// The authenticated subject (email).
    pub fn subject(&self) -> &str {
        &self.sub
    }
}
