use crate::{
    error::{AppError, AppResult},
    models::{category, Category, CategoryModel, CategoryStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Statement,
};

/// Owns category records and their denormalized `post_count`. The counter
/// is only ever moved through `adjust_post_count`, and only by post
/// lifecycle events.
pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_active(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .filter(category::Column::Status.eq(CategoryStatus::Active))
            .order_by_desc(category::Column::PostCount)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> AppResult<CategoryModel> {
        let now = chrono::Utc::now().naive_utc();

        let new_category = category::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            description: sea_orm::ActiveValue::Set(description.to_string()),
            icon: sea_orm::ActiveValue::Set(icon),
            color: sea_orm::ActiveValue::Set(color),
            post_count: sea_orm::ActiveValue::Set(0),
            status: sea_orm::ActiveValue::Set(CategoryStatus::Active),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let category = new_category.insert(&self.db).await?;
        Ok(category)
    }

    pub async fn get_active(&self, id: i32) -> AppResult<CategoryModel> {
        Self::get_active_on(&self.db, id).await
    }

    /// Active-category lookup usable inside a caller's transaction. Post
    /// creation must be rejected, not silently orphaned, when the category
    /// is missing or inactive.
    pub async fn get_active_on<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<CategoryModel> {
        let category = Category::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(AppError::NotFound)?;

        if category.status != CategoryStatus::Active {
            return Err(AppError::NotFound);
        }

        Ok(category)
    }

    /// Atomic `post_count` adjustment, clamped at zero. Runs on the caller's
    /// connection so it commits with the post write it compensates for.
    pub async fn adjust_post_count<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        delta: i32,
    ) -> AppResult<()> {
        conn.execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "UPDATE categories SET post_count = GREATEST(post_count + $1, 0), updated_at = NOW() \
             WHERE id = $2",
            vec![delta.into(), id.into()],
        ))
        .await?;
        Ok(())
    }
}
