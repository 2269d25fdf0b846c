//! Handler functions for user account management endpoints.
//!
//! The DTOs here are the only place where the external camelCase shape and
//! the internal snake_case model meet. Requests are accepted in either
//! form; responses always emit camelCase.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::user::{NewUser, User, UserPatch};

use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// Public user representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_phone: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            mobile_phone: user.mobile_phone,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    #[serde(alias = "first_name")]
    pub first_name: String,
    #[serde(alias = "last_name")]
    pub last_name: String,
    pub email: String,
    #[serde(alias = "mobile_phone")]
    pub mobile_phone: String,
    #[serde(default)]
    pub verified: bool,
    pub password: Option<String>,
}

impl From<CreateUserBody> for NewUser {
    fn from(body: CreateUserBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            mobile_phone: body.mobile_phone,
            verified: body.verified,
            password: body.password,
        }
    }
}

/// Request body for partially updating a user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "mobile_phone")]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
}

impl From<UpdateUserBody> for UserPatch {
    fn from(body: UpdateUserBody) -> Self {
        Self {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            mobile_phone: body.mobile_phone,
            verified: body.verified,
            password: body.password,
        }
    }
}

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// List users within pagination limits.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(100);

    let users = state.accounts.list_users(offset, limit).await?;

    let responses: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    info!(count = responses.len(), "Listed users");
    Ok(Json(responses))
}

/// Get a particular user.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.accounts.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Create a new user.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.accounts.create_user(body.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Partially update a user.
#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserBody>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.accounts.update_user(id, body.into()).await?;
    Ok(Json(user.into()))
}

/// Delete a user.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.accounts.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
