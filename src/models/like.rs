use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminator for the shared likes table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum LikeTarget {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "reply")]
    Reply,
}

impl LikeTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeTarget::Post => "post",
            LikeTarget::Reply => "reply",
        }
    }

    /// Table carrying the denormalized `like_count` for this target kind.
    pub fn counter_table(self) -> &'static str {
        match self {
            LikeTarget::Post => "posts",
            LikeTarget::Reply => "replies",
        }
    }
}

/// Like row. At most one per `(user_id, target_id, target_type)` — the
/// unique index is what makes the toggle idempotent under races.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "likes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub target_id: i32,
    pub target_type: LikeTarget,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::LikeTarget;

    #[test]
    fn counter_table_mapping() {
        assert_eq!(LikeTarget::Post.counter_table(), "posts");
        assert_eq!(LikeTarget::Reply.counter_table(), "replies");
    }

    #[test]
    fn wire_names() {
        assert_eq!(LikeTarget::Post.as_str(), "post");
        assert_eq!(LikeTarget::Reply.as_str(), "reply");
    }
}
