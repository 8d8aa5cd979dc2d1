//! User handlers.

use axum::{
    extract::{rejection::PathRejection, Extension, Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(load_user(&state, current_user.id).await?))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Malformed user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<UserResponse>> {
    let Path(id) = id.map_err(AppError::from)?;
    Ok(Json(load_user(&state, id).await?))
}

/// Read-through lookup: cache first, then the user service.
///
/// The cache is an optimisation only. Read and write failures are logged
/// and the request is served from the database.
async fn load_user(state: &AppState, id: Uuid) -> AppResult<UserResponse> {
    if let Some(cache) = &state.cache {
        match cache.get_user(&id).await {
            Ok(Some(user)) => return Ok(user),
            Ok(None) => {}
            Err(e) => tracing::warn!(user_id = %id, error = %e, "User cache read failed"),
        }
    }

    let user = UserResponse::from(state.user_service.get_user(id).await?);

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set_user(&user).await {
            tracing::warn!(user_id = %id, error = %e, "User cache write failed");
        }
    }

    Ok(user)
}
