use crate::{
    error::{AppError, AppResult},
    models::{
        category, Category, CategoryModel, ContentStatus, LikeTarget, Post, PostModel, Reply,
        ReplyModel,
    },
    services::{
        like::LikeLedger,
        post::PostStore,
        read_tracker::ReadTracker,
        reply::{ReplySort, ReplyTree},
    },
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub author_id: Option<i32>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    Latest,
    Popular,
    MostReplies,
    MostViews,
}

impl PostSort {
    pub fn parse(s: &str) -> Self {
        match s {
            "popular" => PostSort::Popular,
            "most_replies" => PostSort::MostReplies,
            "most_views" => PostSort::MostViews,
            _ => PostSort::Latest,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            PostSort::Latest => "p.is_pinned DESC, p.created_at DESC",
            PostSort::Popular => "p.like_count DESC, p.reply_count DESC, p.created_at DESC",
            PostSort::MostReplies => "p.reply_count DESC, p.created_at DESC",
            PostSort::MostViews => "p.view_count DESC, p.created_at DESC",
        }
    }
}

/// One page of posts with the requesting actor's likes resolved in a single
/// batch query.
pub struct PostPage {
    pub posts: Vec<PostModel>,
    pub liked: HashSet<i32>,
    pub total: u64,
}

pub struct ReplyPage {
    pub replies: Vec<ReplyModel>,
    pub liked: HashSet<i32>,
    pub total: u64,
}

pub struct ForumStats {
    pub total_posts: u64,
    pub total_replies: u64,
    pub total_users: u64,
    pub active_users: u64,
    pub top_categories: Vec<CategoryModel>,
}

/// Stateless read side: pagination, sort selection and `is_liked`
/// enrichment layered over the stores. All filter predicates are ANDed;
/// the total is computed from the same predicate before pagination.
pub struct QueryEngine {
    db: DatabaseConnection,
}

impl QueryEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        page: u64,
        per_page: u64,
        actor_id: Option<i32>,
    ) -> AppResult<PostPage> {
        let (where_clause, values) = build_filter(filter);

        let count_sql = format!("SELECT COUNT(*) FROM posts p WHERE {where_clause}");
        let count_row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                &count_sql,
                values.clone(),
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;
        let total: i64 = count_row.try_get_by_index(0)?;

        let offset = page.saturating_sub(1) * per_page;
        let mut page_values = values;
        let limit_param = page_values.len() + 1;
        let offset_param = page_values.len() + 2;
        page_values.push((per_page as i64).into());
        page_values.push((offset as i64).into());

        let page_sql = format!(
            "SELECT p.* FROM posts p WHERE {where_clause} \
             ORDER BY {} LIMIT ${limit_param} OFFSET ${offset_param}",
            sort.order_clause()
        );

        let posts = PostModel::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            &page_sql,
            page_values,
        ))
        .all(&self.db)
        .await?;

        let liked = match actor_id {
            Some(uid) if !posts.is_empty() => {
                let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
                LikeLedger::new(self.db.clone())
                    .liked_ids(uid, LikeTarget::Post, &ids)
                    .await?
            }
            _ => HashSet::new(),
        };

        Ok(PostPage {
            posts,
            liked,
            total: total as u64,
        })
    }

    /// Fetches one visible post and applies the read side effects: an
    /// authenticated read is deduplicated through the ReadTracker, an
    /// anonymous read bumps the view count unconditionally.
    pub async fn get_post(
        &self,
        id: i32,
        actor_id: Option<i32>,
    ) -> AppResult<(PostModel, bool)> {
        let store = PostStore::new(self.db.clone());

        // Resolve existence before any side effect
        store.get_visible(id).await?;

        let tracker = ReadTracker::new(self.db.clone());
        match actor_id {
            Some(uid) => {
                tracker.record_read(uid, id).await?;
            }
            None => tracker.record_anonymous_read(id).await?,
        }

        let post = store.get_visible(id).await?;

        let is_liked = match actor_id {
            Some(uid) => !LikeLedger::new(self.db.clone())
                .liked_ids(uid, LikeTarget::Post, &[id])
                .await?
                .is_empty(),
            None => false,
        };

        Ok((post, is_liked))
    }

    /// One level of the reply forest, annotated with the actor's likes.
    pub async fn list_replies(
        &self,
        post_id: i32,
        parent_id: Option<i32>,
        sort: ReplySort,
        page: u64,
        per_page: u64,
        actor_id: Option<i32>,
    ) -> AppResult<ReplyPage> {
        PostStore::new(self.db.clone()).get_visible(post_id).await?;

        let tree = ReplyTree::new(self.db.clone());
        let (replies, total) = match parent_id {
            Some(pid) => tree.list_children(pid, sort, page, per_page).await?,
            None => tree.list_top_level(post_id, sort, page, per_page).await?,
        };

        let liked = match actor_id {
            Some(uid) if !replies.is_empty() => {
                let ids: Vec<i32> = replies.iter().map(|r| r.id).collect();
                LikeLedger::new(self.db.clone())
                    .liked_ids(uid, LikeTarget::Reply, &ids)
                    .await?
            }
            _ => HashSet::new(),
        };

        Ok(ReplyPage {
            replies,
            liked,
            total,
        })
    }

    pub async fn stats(&self) -> AppResult<ForumStats> {
        use crate::models::{post, reply};

        let total_posts = Post::find()
            .filter(post::Column::Status.eq(ContentStatus::Published))
            .count(&self.db)
            .await?;

        let total_replies = Reply::find()
            .filter(reply::Column::Status.eq(ContentStatus::Published))
            .count(&self.db)
            .await?;

        // Identity lives elsewhere; participants are the distinct actors
        // seen authoring posts or replies.
        let total_users = self
            .count_scalar(
                "SELECT COUNT(*) FROM ( \
                   SELECT author_id FROM posts UNION SELECT author_id FROM replies \
                 ) AS authors",
            )
            .await?;

        let active_users = self
            .count_scalar(
                "SELECT COUNT(*) FROM ( \
                   SELECT author_id FROM posts WHERE created_at >= NOW() - INTERVAL '30 days' \
                   UNION \
                   SELECT author_id FROM replies WHERE created_at >= NOW() - INTERVAL '30 days' \
                 ) AS authors",
            )
            .await?;

        let top_categories = Category::find()
            .filter(category::Column::Status.eq(crate::models::CategoryStatus::Active))
            .order_by_desc(category::Column::PostCount)
            .limit(5)
            .all(&self.db)
            .await?;

        Ok(ForumStats {
            total_posts,
            total_replies,
            total_users,
            active_users,
            top_categories,
        })
    }

    async fn count_scalar(&self, sql: &str) -> AppResult<u64> {
        let row = self
            .db
            .query_one(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql.to_string(),
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;
        let count: i64 = row.try_get_by_index(0)?;
        Ok(count as u64)
    }
}

/// Builds the WHERE clause and bind values for a post filter. Only
/// published posts are ever listed; every other predicate is ANDed on top.
fn build_filter(filter: &PostFilter) -> (String, Vec<sea_orm::Value>) {
    let mut conditions = vec!["p.status = 'published'".to_string()];
    let mut values: Vec<sea_orm::Value> = Vec::new();

    if let Some(category_id) = filter.category_id {
        values.push(category_id.into());
        conditions.push(format!("p.category_id = ${}", values.len()));
    }

    if let Some(q) = filter.search.as_deref() {
        let q = q.trim();
        if !q.is_empty() {
            values.push(format!("%{}%", escape_like(q)).into());
            let n = values.len();
            conditions.push(format!("(p.title ILIKE ${n} OR p.content ILIKE ${n})"));
        }
    }

    if !filter.tags.is_empty() {
        // OR semantics across the supplied tags
        let mut parts = Vec::new();
        for tag in &filter.tags {
            values.push(serde_json::json!([tag]).to_string().into());
            parts.push(format!("p.tags @> ${}::jsonb", values.len()));
        }
        conditions.push(format!("({})", parts.join(" OR ")));
    }

    if let Some(author_id) = filter.author_id {
        values.push(author_id.into());
        conditions.push(format!("p.author_id = ${}", values.len()));
    }

    if let Some(pinned) = filter.pinned {
        values.push(pinned.into());
        conditions.push(format!("p.is_pinned = ${}", values.len()));
    }

    (conditions.join(" AND "), values)
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
