use crate::{
    error::{AppError, AppResult},
    models::{reply, ContentStatus, LikeTarget, Post, Reply, ReplyModel},
    services::{like::LikeLedger, Author},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Statement, TransactionTrait,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySort {
    Oldest,
    Latest,
    Popular,
}

impl ReplySort {
    pub fn parse(s: &str) -> Self {
        match s {
            "latest" => ReplySort::Latest,
            "popular" => ReplySort::Popular,
            _ => ReplySort::Oldest,
        }
    }
}

/// Owns replies and the per-post `reply_count`. The tree is a forest rooted
/// at top-level replies, fetched one level at a time; recursive expansion is
/// the caller's business.
pub struct ReplyTree {
    db: DatabaseConnection,
}

impl ReplyTree {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_top_level(
        &self,
        post_id: i32,
        sort: ReplySort,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ReplyModel>, u64)> {
        let query = Reply::find()
            .filter(reply::Column::PostId.eq(post_id))
            .filter(reply::Column::ParentId.is_null())
            .filter(reply::Column::Status.eq(ContentStatus::Published));

        self.paginate(Self::apply_sort(query, sort), page, per_page)
            .await
    }

    /// Children of one reply. A deleted parent does not filter its children
    /// out; orphans under a tombstoned parent stay listable.
    pub async fn list_children(
        &self,
        parent_id: i32,
        sort: ReplySort,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ReplyModel>, u64)> {
        let query = Reply::find()
            .filter(reply::Column::ParentId.eq(parent_id))
            .filter(reply::Column::Status.eq(ContentStatus::Published));

        self.paginate(Self::apply_sort(query, sort), page, per_page)
            .await
    }

    /// Creates a reply. Preconditions: the post is published and unlocked;
    /// a given parent must be a published reply under the same post. The
    /// insert, the `reply_count` increment and the `last_reply_at` refresh
    /// commit as one unit.
    pub async fn create(
        &self,
        author: &Author,
        post_id: i32,
        content: &str,
        parent_id: Option<i32>,
    ) -> AppResult<ReplyModel> {
        let post = Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if post.status != ContentStatus::Published {
            return Err(AppError::NotFound);
        }
        if post.is_locked {
            return Err(AppError::Locked);
        }

        if let Some(pid) = parent_id {
            let parent = Reply::find_by_id(pid)
                .one(&self.db)
                .await?
                .ok_or(AppError::NotFound)?;

            if parent.post_id != post_id || parent.status != ContentStatus::Published {
                return Err(AppError::NotFound);
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let new_reply = reply::ActiveModel {
            post_id: sea_orm::ActiveValue::Set(post_id),
            parent_id: sea_orm::ActiveValue::Set(parent_id),
            author_id: sea_orm::ActiveValue::Set(author.id),
            author_name: sea_orm::ActiveValue::Set(author.name.clone()),
            author_avatar: sea_orm::ActiveValue::Set(author.avatar.clone()),
            author_role: sea_orm::ActiveValue::Set(author.role.clone()),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            like_count: sea_orm::ActiveValue::Set(0),
            is_author: sea_orm::ActiveValue::Set(author.id == post.author_id),
            status: sea_orm::ActiveValue::Set(ContentStatus::Published),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_reply.insert(&txn).await?;

        txn.execute(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "UPDATE posts SET reply_count = reply_count + 1, last_reply_at = NOW() WHERE id = $1",
            vec![post_id.into()],
        ))
        .await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Soft delete by the author or an admin. Purges likes on the reply and
    /// decrements the post's `reply_count`. Child replies are NOT cascaded;
    /// they stay attached to the tombstoned parent.
    pub async fn soft_delete(&self, id: i32, actor_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = Reply::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.status == ContentStatus::Deleted {
            return Err(AppError::NotFound);
        }
        if existing.author_id != actor_id && !is_admin {
            return Err(AppError::Forbidden);
        }
        if !existing.status.can_transition_to(ContentStatus::Deleted) {
            return Err(AppError::Validation("Invalid status transition".to_string()));
        }

        let was_published = existing.status == ContentStatus::Published;
        let post_id = existing.post_id;
        let now = chrono::Utc::now().naive_utc();

        let txn = self.db.begin().await?;

        let mut active: reply::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(ContentStatus::Deleted);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&txn).await?;

        LikeLedger::purge_target(&txn, id, LikeTarget::Reply).await?;

        if was_published {
            txn.execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "UPDATE posts SET reply_count = GREATEST(reply_count - 1, 0) WHERE id = $1",
                vec![post_id.into()],
            ))
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    fn apply_sort(query: Select<Reply>, sort: ReplySort) -> Select<Reply> {
        match sort {
            ReplySort::Oldest => query.order_by_asc(reply::Column::CreatedAt),
            ReplySort::Latest => query.order_by_desc(reply::Column::CreatedAt),
            ReplySort::Popular => query
                .order_by_desc(reply::Column::LikeCount)
                .order_by_desc(reply::Column::CreatedAt),
        }
    }

    async fn paginate(
        &self,
        query: Select<Reply>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ReplyModel>, u64)> {
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let replies = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((replies, total))
    }
}
