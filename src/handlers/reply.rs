use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::models::{ContentStatus, ReplyModel};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::query::QueryEngine;
use crate::services::reply::{ReplySort, ReplyTree};
use crate::services::Author;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplyRequest {
    /// Reply content (1-10000 characters)
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    /// Parent reply ID for nested replies
    pub parent_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyResponse {
    /// Reply ID
    pub id: i32,
    /// Post this reply belongs to
    pub post_id: i32,
    /// Parent reply, if nested
    pub parent_id: Option<i32>,
    /// Author user ID
    pub author_id: i32,
    /// Author display name (snapshot)
    pub author_name: String,
    /// Author avatar (snapshot)
    pub author_avatar: Option<String>,
    /// Author role (snapshot)
    pub author_role: String,
    /// Reply content
    pub content: String,
    /// Like count
    pub like_count: i32,
    /// Whether the reply author is the post author
    pub is_author: bool,
    /// Reply status
    pub status: ContentStatus,
    /// Whether the requesting actor has liked this reply
    pub is_liked: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl ReplyResponse {
    pub fn from_model(r: ReplyModel, is_liked: bool) -> Self {
        Self {
            id: r.id,
            post_id: r.post_id,
            parent_id: r.parent_id,
            author_id: r.author_id,
            author_name: r.author_name,
            author_avatar: r.author_avatar,
            author_role: r.author_role,
            content: r.content,
            like_count: r.like_count,
            is_author: r.is_author,
            status: r.status,
            is_liked,
            created_at: r.created_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyListQuery {
    /// List children of this reply instead of top-level replies
    pub parent_id: Option<i32>,
    /// Sort order: oldest (default), latest, popular
    pub sort: Option<String>,
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}/replies",
    params(
        ("post_id" = i32, Path, description = "Post ID"),
        ("parent_id" = Option<i32>, Query, description = "List children of this reply"),
        ("sort" = Option<String>, Query, description = "Sort: oldest, latest, popular"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Paginated replies", body = PaginatedResponse<ReplyResponse>),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn list_replies(
    Extension(db): Extension<DatabaseConnection>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Path(post_id): Path<i32>,
    Query(params): Query<ReplyListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);
    let sort = ReplySort::parse(params.sort.as_deref().unwrap_or("oldest"));

    let engine = QueryEngine::new(db);
    let page_result = engine
        .list_replies(
            post_id,
            params.parent_id,
            sort,
            page,
            per_page,
            actor.map(|a| a.user_id),
        )
        .await?;

    let items: Vec<ReplyResponse> = page_result
        .replies
        .into_iter()
        .map(|r| {
            let is_liked = page_result.liked.contains(&r.id);
            ReplyResponse::from_model(r, is_liked)
        })
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items,
        page_result.total,
        page,
        per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/replies",
    security(("jwt_token" = [])),
    params(("post_id" = i32, Path, description = "Post ID")),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Reply created", body = ReplyResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Post or parent reply not found", body = AppError),
        (status = 423, description = "Post is locked", body = AppError),
    ),
    tag = "replies"
)]
pub async fn create_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
    Json(payload): Json<CreateReplyRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tree = ReplyTree::new(db);
    let reply = tree
        .create(
            &Author::from(&auth_user),
            post_id,
            &payload.content,
            payload.parent_id,
        )
        .await?;

    Ok(ApiResponse::ok(ReplyResponse::from_model(reply, false)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/replies/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply deleted", body = String),
        (status = 403, description = "Not the author or an admin", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn delete_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let tree = ReplyTree::new(db);
    tree.soft_delete(id, auth_user.user_id, auth_user.is_admin())
        .await?;

    Ok(ApiResponse::ok("Reply deleted"))
}
