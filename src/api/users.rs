//! User listing endpoints (admin)

use axum::{
    extract::{Path, State},
    Json,
};

use super::AuthenticatedUser;
use crate::{error::AppResult, models::User, AppState};

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users ordered by username", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_admin()?;

    let users = state.services.auth.get_users().await?;
    Ok(Json(users))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.auth.get_user(&username).await?;
    Ok(Json(user))
}
