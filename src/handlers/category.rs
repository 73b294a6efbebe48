use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::models::{CategoryModel, CategoryStatus};
use crate::response::ApiResponse;
use crate::services::category::CategoryStore;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Category description
    #[validate(length(max = 2000))]
    pub description: String,
    /// Icon identifier or URL
    pub icon: Option<String>,
    /// Display color
    #[validate(length(max = 20))]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    /// Category ID
    pub id: i32,
    /// Category name
    pub name: String,
    /// Category description
    pub description: String,
    /// Icon identifier or URL
    pub icon: Option<String>,
    /// Display color
    pub color: Option<String>,
    /// Number of published posts in this category
    pub post_count: i32,
    /// Category status
    pub status: CategoryStatus,
    /// Creation timestamp
    pub created_at: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            color: c.color,
            post_count: c.post_count,
            status: c.status,
            created_at: c.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Active categories ordered by post count", body = Vec<CategoryResponse>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let store = CategoryStore::new(db);
    let categories = store.list_active().await?;
    let items: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    security(("jwt_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "categories"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = CategoryStore::new(db);
    let category = store
        .create(&payload.name, &payload.description, payload.icon, payload.color)
        .await?;

    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}
