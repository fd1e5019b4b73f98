//! User lookup endpoints (query service)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::repos::UserRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::models::{UserName, ValidationError};

/// Query parameters for GET /api/user
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub name: Option<String>,
}

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// Create user response
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub status: &'static str,
    pub name: String,
}

/// GET /api/user?name=... - greet a known user
async fn greet_user(
    State(pool): State<PgPool>,
    Query(params): Query<UserQuery>,
) -> Result<String, ApiError> {
    let raw = params
        .name
        .filter(|n| !n.is_empty())
        .ok_or(ValidationError::Missing { field: "name" })?;
    let name = UserName::new(&raw)?;

    if !UserRepo::new(&pool).exists(&name).await? {
        return Err(ApiError::NotFound {
            message: format!("user '{}' not found", name.as_str()),
        });
    }

    Ok(format!("Hello, {}!", name.as_str()))
}

/// POST /api/user - register a user
async fn create_user(
    State(pool): State<PgPool>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let name = UserName::new(&req.name)?;
    let user = UserRepo::new(&pool).create(&name).await?;
    tracing::info!(id = user.id, name = %user.name, "user created");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            status: "user created",
            name: user.name,
        }),
    ))
}

/// User routes
pub fn router() -> Router<PgPool> {
    Router::new().route("/api/user", get(greet_user).post(create_user))
}
