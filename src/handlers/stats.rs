use crate::error::{AppError, AppResult};
use crate::handlers::category::CategoryResponse;
use crate::middleware::auth::{require_admin, AuthUser};
use crate::response::ApiResponse;
use crate::services::query::QueryEngine;
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total published posts
    pub total_posts: u64,
    /// Total published replies
    pub total_replies: u64,
    /// Distinct users who have authored a post or reply
    pub total_users: u64,
    /// Distinct users who authored a post or reply in the last 30 days
    pub active_users: u64,
    /// Most active categories by post count
    pub top_categories: Vec<CategoryResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Forum statistics", body = StatsResponse),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let engine = QueryEngine::new(db);
    let stats = engine.stats().await?;

    Ok(ApiResponse::ok(StatsResponse {
        total_posts: stats.total_posts,
        total_replies: stats.total_replies,
        total_users: stats.total_users,
        active_users: stats.active_users,
        top_categories: stats
            .top_categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect(),
    }))
}
