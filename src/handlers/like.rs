use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::LikeTarget;
use crate::response::ApiResponse;
use crate::services::like::LikeLedger;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleLikeRequest {
    /// ID of the post or reply
    pub target_id: i32,
    /// Target kind: post or reply
    pub target_type: LikeTarget,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    /// Whether the actor likes the target after the toggle
    pub is_liked: bool,
    /// The target's like count after the toggle
    pub like_count: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/likes",
    security(("jwt_token" = [])),
    request_body = ToggleLikeRequest,
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Target not found or not visible", body = AppError),
    ),
    tag = "likes"
)]
pub async fn toggle_like(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<ToggleLikeRequest>,
) -> AppResult<impl IntoResponse> {
    let ledger = LikeLedger::new(db);
    let outcome = ledger
        .toggle(auth_user.user_id, payload.target_id, payload.target_type)
        .await?;

    Ok(ApiResponse::ok(LikeResponse {
        is_liked: outcome.is_liked,
        like_count: outcome.like_count,
    }))
}
