use crate::{
    error::{AppError, AppResult},
    models::{like, ContentStatus, Like, LikeTarget, Post, Reply},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement,
    TransactionTrait,
};
use std::collections::HashSet;

/// Single source of truth for the like relation. One likes table serves
/// posts and replies, discriminated by `target_type`.
pub struct LikeLedger {
    db: DatabaseConnection,
}

#[derive(Debug, Clone, Copy)]
pub struct LikeOutcome {
    pub is_liked: bool,
    pub like_count: i32,
}

impl LikeLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Idempotent like toggle. The row mutation and the counter move commit
    /// in one transaction; a race on the unique `(user_id, target_id,
    /// target_type)` key resolves to "already in desired state" rather than
    /// an error. The returned count is re-read from the target row, not
    /// computed locally, so a concurrent cascade delete in the same window
    /// cannot drift it.
    pub async fn toggle(
        &self,
        user_id: i32,
        target_id: i32,
        target: LikeTarget,
    ) -> AppResult<LikeOutcome> {
        self.ensure_target_visible(target_id, target).await?;

        let table = target.counter_table();
        let txn = self.db.begin().await?;

        let existing = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TargetType.eq(target))
            .filter(like::Column::TargetId.eq(target_id))
            .one(&txn)
            .await?;

        let is_liked = if existing.is_some() {
            let deleted = Like::delete_many()
                .filter(like::Column::UserId.eq(user_id))
                .filter(like::Column::TargetType.eq(target))
                .filter(like::Column::TargetId.eq(target_id))
                .exec(&txn)
                .await?;

            // The same race exists on the way out: a concurrent unlike from
            // this user may have removed the row (and moved the counter)
            // after our read. Only the toggle that deleted the row owns the
            // decrement.
            if deleted.rows_affected == 1 {
                txn.execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    &format!(
                        "UPDATE {table} SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"
                    ),
                    vec![target_id.into()],
                ))
                .await?;
            }

            false
        } else {
            let inserted = txn
                .execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    "INSERT INTO likes (user_id, target_id, target_type, created_at) \
                     VALUES ($1, $2, $3, NOW()) \
                     ON CONFLICT (user_id, target_id, target_type) DO NOTHING",
                    vec![user_id.into(), target_id.into(), target.as_str().into()],
                ))
                .await?;

            // A lost race on the unique key means another request from the
            // same user already recorded this like and moved the counter.
            if inserted.rows_affected() == 1 {
                txn.execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    &format!("UPDATE {table} SET like_count = like_count + 1 WHERE id = $1"),
                    vec![target_id.into()],
                ))
                .await?;
            }

            true
        };

        let row = txn
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &format!("SELECT like_count FROM {table} WHERE id = $1"),
                vec![target_id.into()],
            ))
            .await?
            .ok_or(AppError::NotFound)?;
        let like_count: i32 = row.try_get_by_index(0)?;

        txn.commit().await?;

        Ok(LikeOutcome {
            is_liked,
            like_count,
        })
    }

    /// Which of `ids` the user has liked, in a single query. Used to
    /// annotate result pages without a per-row lookup.
    pub async fn liked_ids(
        &self,
        user_id: i32,
        target: LikeTarget,
        ids: &[i32],
    ) -> AppResult<HashSet<i32>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TargetType.eq(target))
            .filter(like::Column::TargetId.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|l| l.target_id).collect())
    }

    /// Deletes every like pointing at the target. Runs on the caller's
    /// connection so cascades commit atomically with the soft delete.
    pub async fn purge_target<C: ConnectionTrait>(
        conn: &C,
        target_id: i32,
        target: LikeTarget,
    ) -> AppResult<()> {
        Like::delete_many()
            .filter(like::Column::TargetType.eq(target))
            .filter(like::Column::TargetId.eq(target_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn ensure_target_visible(&self, target_id: i32, target: LikeTarget) -> AppResult<()> {
        let status = match target {
            LikeTarget::Post => {
                Post::find_by_id(target_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?
                    .status
            }
            LikeTarget::Reply => {
                Reply::find_by_id(target_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::NotFound)?
                    .status
            }
        };

        if status != ContentStatus::Published {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
