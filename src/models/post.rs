use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::ContentStatus;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RequiredPlan {
    #[default]
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "pro")]
    Pro,
}

/// Forum post.
///
/// Author fields are a snapshot captured at creation time, not a live join;
/// later profile changes do not rewrite existing posts (display-name
/// stability is deliberate). `view_count`, `like_count` and `reply_count`
/// are denormalized and maintained exclusively by the owning stores.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author_id: i32,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub author_role: String,
    pub category_id: i32,
    pub category_name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub required_plan: RequiredPlan,
    pub view_count: i32,
    pub like_count: i32,
    pub reply_count: i32,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub status: ContentStatus,
    pub last_reply_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_value(self.tags.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::reply::Entity")]
    Replies,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::reply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Replies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
