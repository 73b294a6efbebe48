use crate::{
    error::AppResult,
    models::{read_record, ReadRecord},
    services::post::PostStore,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement,
    TransactionTrait,
};

/// Per-actor read markers. The absence-before-insert check is what decides
/// whether a read counts as a new view.
pub struct ReadTracker {
    db: DatabaseConnection,
}

impl ReadTracker {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts the read record and bumps the post's view count on the first
    /// read only. Returns true when this read was the first. The insert and
    /// the counter move commit together; a concurrent first read from the
    /// same user loses the `ON CONFLICT DO NOTHING` race and does not
    /// double-count.
    pub async fn record_read(&self, user_id: i32, post_id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        let existing = ReadRecord::find()
            .filter(read_record::Column::UserId.eq(user_id))
            .filter(read_record::Column::PostId.eq(post_id))
            .one(&txn)
            .await?;

        let first_read = if existing.is_none() {
            let inserted = txn
                .execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    "INSERT INTO read_records (user_id, post_id, read_at) VALUES ($1, $2, NOW()) \
                     ON CONFLICT (user_id, post_id) DO NOTHING",
                    vec![user_id.into(), post_id.into()],
                ))
                .await?;

            if inserted.rows_affected() == 1 {
                PostStore::bump_view_count(&txn, post_id).await?;
                true
            } else {
                false
            }
        } else {
            txn.execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "UPDATE read_records SET read_at = NOW() WHERE user_id = $1 AND post_id = $2",
                vec![user_id.into(), post_id.into()],
            ))
            .await?;
            false
        };

        txn.commit().await?;
        Ok(first_read)
    }

    /// Anonymous reads carry no identity to dedupe on; every hit counts.
    pub async fn record_anonymous_read(&self, post_id: i32) -> AppResult<()> {
        PostStore::bump_view_count(&self.db, post_id).await
    }
}
