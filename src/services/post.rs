use crate::{
    error::{AppError, AppResult},
    models::{post, read_record, ContentStatus, LikeTarget, Post, PostModel, ReadRecord, RequiredPlan},
    services::{category::CategoryStore, like::LikeLedger, Author},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Statement, TransactionTrait,
};

pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: i32,
    pub tags: Vec<String>,
    pub required_plan: RequiredPlan,
}

#[derive(Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub required_plan: Option<RequiredPlan>,
}

/// Owns post records and orchestrates the cross-entity updates that post
/// lifecycle events trigger: category counters on create/move/delete, and
/// the like/read-record cascade on delete.
pub struct PostStore {
    db: DatabaseConnection,
}

impl PostStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a published post. The active-category check, the insert and
    /// the category counter increment commit as one unit.
    pub async fn create(&self, author: &Author, input: NewPost) -> AppResult<PostModel> {
        let txn = self.db.begin().await?;

        let category = CategoryStore::get_active_on(&txn, input.category_id).await?;
        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            title: sea_orm::ActiveValue::Set(input.title),
            content: sea_orm::ActiveValue::Set(input.content),
            author_id: sea_orm::ActiveValue::Set(author.id),
            author_name: sea_orm::ActiveValue::Set(author.name.clone()),
            author_avatar: sea_orm::ActiveValue::Set(author.avatar.clone()),
            author_role: sea_orm::ActiveValue::Set(author.role.clone()),
            category_id: sea_orm::ActiveValue::Set(category.id),
            category_name: sea_orm::ActiveValue::Set(category.name),
            tags: sea_orm::ActiveValue::Set(serde_json::json!(input.tags)),
            required_plan: sea_orm::ActiveValue::Set(input.required_plan),
            view_count: sea_orm::ActiveValue::Set(0),
            like_count: sea_orm::ActiveValue::Set(0),
            reply_count: sea_orm::ActiveValue::Set(0),
            is_pinned: sea_orm::ActiveValue::Set(false),
            is_locked: sea_orm::ActiveValue::Set(false),
            status: sea_orm::ActiveValue::Set(ContentStatus::Published),
            last_reply_at: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let post = new_post.insert(&txn).await?;
        CategoryStore::adjust_post_count(&txn, category.id, 1).await?;

        txn.commit().await?;
        Ok(post)
    }

    /// Any non-deleted post. Tombstones resolve to NotFound.
    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        let post = Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if post.status == ContentStatus::Deleted {
            return Err(AppError::NotFound);
        }

        Ok(post)
    }

    /// Published posts only; hidden and deleted are not visible states.
    pub async fn get_visible(&self, id: i32) -> AppResult<PostModel> {
        let post = self.get_by_id(id).await?;
        if post.status != ContentStatus::Published {
            return Err(AppError::NotFound);
        }
        Ok(post)
    }

    /// Edits a post. A category move swaps both counters and refreshes the
    /// `category_name` snapshot atomically with the content update, so the
    /// post never counts toward two categories.
    pub async fn update(
        &self,
        id: i32,
        actor_id: i32,
        is_admin: bool,
        patch: PostPatch,
    ) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != actor_id && !is_admin {
            return Err(AppError::Forbidden);
        }

        let counts_toward_category = existing.status == ContentStatus::Published;
        let old_category = existing.category_id;
        let now = chrono::Utc::now().naive_utc();

        let txn = self.db.begin().await?;

        let mut active: post::ActiveModel = existing.into();

        if let Some(title) = patch.title {
            active.title = sea_orm::ActiveValue::Set(title);
        }
        if let Some(content) = patch.content {
            active.content = sea_orm::ActiveValue::Set(content);
        }
        if let Some(tags) = patch.tags {
            active.tags = sea_orm::ActiveValue::Set(serde_json::json!(tags));
        }
        if let Some(plan) = patch.required_plan {
            active.required_plan = sea_orm::ActiveValue::Set(plan);
        }

        if let Some(new_category) = patch.category_id {
            if new_category != old_category {
                let category = CategoryStore::get_active_on(&txn, new_category).await?;
                if counts_toward_category {
                    CategoryStore::adjust_post_count(&txn, old_category, -1).await?;
                    CategoryStore::adjust_post_count(&txn, category.id, 1).await?;
                }
                active.category_id = sea_orm::ActiveValue::Set(category.id);
                active.category_name = sea_orm::ActiveValue::Set(category.name);
            }
        }

        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Soft delete with cascade: the tombstone write, the like purge, the
    /// read-record purge and the category decrement commit together, or not
    /// at all. Replies are left in place under the deleted post.
    pub async fn soft_delete(&self, id: i32, actor_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.author_id != actor_id && !is_admin {
            return Err(AppError::Forbidden);
        }

        if !existing.status.can_transition_to(ContentStatus::Deleted) {
            return Err(AppError::Validation("Invalid status transition".to_string()));
        }

        let was_published = existing.status == ContentStatus::Published;
        let category_id = existing.category_id;
        let now = chrono::Utc::now().naive_utc();

        let txn = self.db.begin().await?;

        let mut active: post::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(ContentStatus::Deleted);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&txn).await?;

        LikeLedger::purge_target(&txn, id, LikeTarget::Post).await?;

        ReadRecord::delete_many()
            .filter(read_record::Column::PostId.eq(id))
            .exec(&txn)
            .await?;

        if was_published {
            CategoryStore::adjust_post_count(&txn, category_id, -1).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Atomic view counter bump on the caller's connection. Never read,
    /// add, write back.
    pub async fn bump_view_count<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<()> {
        conn.execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1",
            vec![id.into()],
        ))
        .await?;
        Ok(())
    }

    pub async fn set_pinned(&self, id: i32, pinned: bool) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        let mut active: post::ActiveModel = existing.into();
        active.is_pinned = sea_orm::ActiveValue::Set(pinned);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn set_locked(&self, id: i32, locked: bool) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        let mut active: post::ActiveModel = existing.into();
        active.is_locked = sea_orm::ActiveValue::Set(locked);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
