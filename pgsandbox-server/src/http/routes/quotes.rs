//! Random quote endpoints (hello service)

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::repos::QuoteRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::models::QuoteText;

/// Insert message request
#[derive(Debug, Deserialize)]
pub struct InsertQuoteRequest {
    pub msg: String,
}

/// Insert message response
#[derive(Debug, Serialize)]
pub struct InsertQuoteResponse {
    pub status: &'static str,
}

/// GET /get - one random message as plain text
async fn get_quote(State(pool): State<PgPool>) -> Result<String, ApiError> {
    QuoteRepo::new(&pool)
        .random()
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "no messages stored yet".to_string(),
        })
}

/// POST /post - store a message
async fn post_quote(
    State(pool): State<PgPool>,
    ValidJson(req): ValidJson<InsertQuoteRequest>,
) -> Result<(StatusCode, Json<InsertQuoteResponse>), ApiError> {
    let text = QuoteText::new(&req.msg)?;
    let id = QuoteRepo::new(&pool).insert(&text).await?;
    tracing::debug!(id, "message inserted");

    Ok((
        StatusCode::CREATED,
        Json(InsertQuoteResponse {
            status: "message inserted",
        }),
    ))
}

/// Quote routes
pub fn router() -> Router<PgPool> {
    Router::new()
        .route("/get", get(get_quote))
        .route("/post", post(post_quote))
}
