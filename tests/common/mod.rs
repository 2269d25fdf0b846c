//! Test utilities and common setup.

use axum::Router;
use rollcall::api::{self, AppState};
use rollcall::auth::{AuthService, RevocationRepository, TokenIssuer};
use rollcall::db::Database;
use rollcall::user::{AccountService, UserRepository};

/// JWT secret used by the integration tests.
pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Create application state backed by an in-memory database.
pub async fn test_state() -> AppState {
    let db = Database::in_memory().await.unwrap();

    let issuer = TokenIssuer::new(TEST_SECRET, 900, 3600);
    let user_repo = UserRepository::new(db.pool().clone());
    let revocation_repo = RevocationRepository::new(db.pool().clone());

    let accounts = AccountService::new(user_repo.clone());
    let auth = AuthService::new(user_repo, issuer.clone(), revocation_repo);

    AppState::new(
        accounts,
        auth,
        issuer,
        vec!["http://localhost:3000".to_string()],
    )
}

/// Create a test application with all services initialized.
#[allow(dead_code)]
pub async fn test_app() -> Router {
    api::create_router(test_state().await)
}

/// Create a test application and keep the state for direct access.
pub async fn test_app_with_state() -> (Router, AppState) {
    let state = test_state().await;
    (api::create_router(state.clone()), state)
}

/// Mint an access token for a subject.
///
/// The middleware trusts any token signed with the server secret, so this
/// stands in for a login when the test doesn't care about passwords.
pub fn access_token_for(state: &AppState, email: &str) -> String {
    state.issuer.issue_access(email, true).unwrap()
}
