use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of posts and replies. Rows are never physically removed;
/// `Deleted` is a terminal tombstone state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "hidden")]
    Hidden,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl ContentStatus {
    /// Closed transition table. Anything not listed here is rejected before
    /// the row is touched.
    pub fn can_transition_to(self, next: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, next),
            (Published, Hidden) | (Published, Deleted) | (Hidden, Published) | (Hidden, Deleted)
        )
    }
}
