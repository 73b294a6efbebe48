use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::ContentStatus;

/// Threaded reply. `parent_id = NULL` marks a top-level reply; non-null
/// forms a reply-to-reply edge. The forest is fetched one level at a time.
/// `is_author` is computed once at creation (reply author == post author).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "replies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: i32,
    pub parent_id: Option<i32>,
    pub author_id: i32,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub author_role: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub like_count: i32,
    pub is_author: bool,
    pub status: ContentStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
