use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser, MaybeAuthUser};
use crate::models::{ContentStatus, PostModel, RequiredPlan};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::post::{NewPost, PostPatch, PostStore};
use crate::services::query::{PostFilter, PostSort, QueryEngine};
use crate::services::Author;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const MAX_TAGS: usize = 5;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Post content (opaque text)
    #[validate(length(min = 1))]
    pub content: String,
    /// Category ID
    pub category_id: i32,
    /// Tags (up to 5, each 1-30 characters)
    pub tags: Option<Vec<String>>,
    /// Plan required to view the post
    pub required_plan: Option<RequiredPlan>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    /// Post title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// Post content
    #[validate(length(min = 1))]
    pub content: Option<String>,
    /// Move the post to another category
    pub category_id: Option<i32>,
    /// Replace the tag set
    pub tags: Option<Vec<String>>,
    /// Plan required to view the post
    pub required_plan: Option<RequiredPlan>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPinnedRequest {
    pub pinned: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLockedRequest {
    pub locked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    /// Post title
    pub title: String,
    /// Post content
    pub content: String,
    /// Author user ID
    pub author_id: i32,
    /// Author display name (snapshot from creation time)
    pub author_name: String,
    /// Author avatar (snapshot)
    pub author_avatar: Option<String>,
    /// Author role (snapshot)
    pub author_role: String,
    /// Category ID
    pub category_id: i32,
    /// Category name (snapshot)
    pub category_name: String,
    /// Post tags
    pub tags: Vec<String>,
    /// Plan required to view
    pub required_plan: RequiredPlan,
    /// View count
    pub view_count: i32,
    /// Like count
    pub like_count: i32,
    /// Published reply count
    pub reply_count: i32,
    /// Whether post is pinned
    pub is_pinned: bool,
    /// Whether post is locked (no new replies)
    pub is_locked: bool,
    /// Post status
    pub status: ContentStatus,
    /// Whether the requesting actor has liked this post
    pub is_liked: bool,
    /// Timestamp of the most recent reply
    pub last_reply_at: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl PostResponse {
    pub fn from_model(p: PostModel, is_liked: bool) -> Self {
        let tags = p.tag_list();
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            author_id: p.author_id,
            author_name: p.author_name,
            author_avatar: p.author_avatar,
            author_role: p.author_role,
            category_id: p.category_id,
            category_name: p.category_name,
            tags,
            required_plan: p.required_plan,
            view_count: p.view_count,
            like_count: p.like_count,
            reply_count: p.reply_count,
            is_pinned: p.is_pinned,
            is_locked: p.is_locked,
            status: p.status,
            is_liked,
            last_reply_at: p.last_reply_at.map(|t| t.to_string()),
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostListQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
    /// Sort order: latest, popular, most_replies, most_views
    pub sort: Option<String>,
    /// Filter by category
    pub category_id: Option<i32>,
    /// Case-insensitive substring search over title and content
    pub q: Option<String>,
    /// Comma-separated tags (OR semantics)
    pub tags: Option<String>,
    /// Filter by author
    pub author_id: Option<i32>,
    /// Filter by pinned flag
    pub pinned: Option<bool>,
}

fn validate_tags(tags: &[String]) -> AppResult<()> {
    if tags.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_TAGS} tags allowed"
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() || tag.len() > 30 {
            return Err(AppError::Validation(
                "Each tag must be 1-30 characters".to_string(),
            ));
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
        ("sort" = Option<String>, Query, description = "Sort: latest, popular, most_replies, most_views"),
        ("category_id" = Option<i32>, Query, description = "Filter by category"),
        ("q" = Option<String>, Query, description = "Substring search over title/content"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags, OR semantics"),
        ("author_id" = Option<i32>, Query, description = "Filter by author"),
        ("pinned" = Option<bool>, Query, description = "Filter by pinned flag"),
    ),
    responses(
        (status = 200, description = "Paginated posts", body = PaginatedResponse<PostResponse>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Query(params): Query<PostListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);
    let sort = PostSort::parse(params.sort.as_deref().unwrap_or("latest"));

    let tags = params
        .tags
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let filter = PostFilter {
        category_id: params.category_id,
        search: params.q,
        tags,
        author_id: params.author_id,
        pinned: params.pinned,
    };

    let engine = QueryEngine::new(db);
    let page_result = engine
        .list_posts(&filter, sort, page, per_page, actor.map(|a| a.user_id))
        .await?;

    let items: Vec<PostResponse> = page_result
        .posts
        .into_iter()
        .map(|p| {
            let is_liked = page_result.liked.contains(&p.id);
            PostResponse::from_model(p, is_liked)
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
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let engine = QueryEngine::new(db);
    let (post, is_liked) = engine.get_post(id, actor.map(|a| a.user_id)).await?;

    Ok(ApiResponse::ok(PostResponse::from_model(post, is_liked)))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Category not found or inactive", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tags = payload.tags.unwrap_or_default();
    validate_tags(&tags)?;

    let store = PostStore::new(db);
    let post = store
        .create(
            &Author::from(&auth_user),
            NewPost {
                title: payload.title,
                content: payload.content,
                category_id: payload.category_id,
                tags,
                required_plan: payload.required_plan.unwrap_or_default(),
            },
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_model(post, false)))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author or an admin", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(tags) = &payload.tags {
        validate_tags(tags)?;
    }

    let store = PostStore::new(db);
    let post = store
        .update(
            id,
            auth_user.user_id,
            auth_user.is_admin(),
            PostPatch {
                title: payload.title,
                content: payload.content,
                category_id: payload.category_id,
                tags: payload.tags,
                required_plan: payload.required_plan,
            },
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from_model(post, false)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = String),
        (status = 403, description = "Not the author or an admin", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let store = PostStore::new(db);
    store
        .soft_delete(id, auth_user.user_id, auth_user.is_admin())
        .await?;

    Ok(ApiResponse::ok("Post deleted"))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}/pin",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = SetPinnedRequest,
    responses(
        (status = 200, description = "Pin state set", body = PostResponse),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "posts"
)]
pub async fn pin_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetPinnedRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let store = PostStore::new(db);
    let post = store.set_pinned(id, payload.pinned).await?;
    Ok(ApiResponse::ok(PostResponse::from_model(post, false)))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}/lock",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = SetLockedRequest,
    responses(
        (status = 200, description = "Lock state set", body = PostResponse),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "posts"
)]
pub async fn lock_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetLockedRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let store = PostStore::new(db);
    let post = store.set_locked(id, payload.locked).await?;
    Ok(ApiResponse::ok(PostResponse::from_model(post, false)))
}
