//! Authentication handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::{CurrentUser, IssuedTokens};

use crate::api::error::ApiResult;
use crate::api::handlers::users::UserResponse;
use crate::api::state::AppState;

/// Login request. The username doubles as the account email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token pair response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer",
            expires_in: tokens.expires_in,
        }
    }
}

/// Request carrying a refresh token (refresh and logout).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

/// Authenticate with email and password and issue a token pair.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(tokens.into()))
}

/// Exchange a refresh token for a new token pair.
#[instrument(skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// End the session belonging to a refresh token.
#[instrument(skip(state, request))]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<StatusCode> {
    state.auth.logout(&request.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the currently logged in user.
#[instrument(skip(state, user), fields(subject = %user.subject()))]
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let me = state.auth.current_user(&user.claims).await?;
    Ok(Json(me.into()))
}
