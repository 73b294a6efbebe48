pub mod category;
pub mod like;
pub mod post;
pub mod query;
pub mod read_tracker;
pub mod reply;

/// Actor fields snapshotted onto posts and replies at creation time.
/// Sourced from the identity token; never re-joined afterwards.
#[derive(Debug, Clone)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub avatar: Option<String>,
    pub role: String,
}

impl From<&crate::middleware::auth::AuthUser> for Author {
    fn from(user: &crate::middleware::auth::AuthUser) -> Self {
        Self {
            id: user.user_id,
            name: user.display_name.clone(),
            avatar: user.avatar_url.clone(),
            role: user.role.clone(),
        }
    }
}
