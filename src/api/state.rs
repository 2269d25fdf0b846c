//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AuthService, TokenIssuer};
use crate::user::AccountService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Account service for user CRUD.
    pub accounts: Arc<AccountService>,
    /// Auth service for login/refresh/logout/identity.
    pub auth: Arc<AuthService>,
    /// Token issuer, also consumed by the auth middleware.
    pub issuer: TokenIssuer,
    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        accounts: AccountService,
        auth: AuthService,
        issuer: TokenIssuer,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            accounts: Arc::new(accounts),
            auth: Arc::new(auth),
            issuer,
            allowed_origins,
        }
    }
}
