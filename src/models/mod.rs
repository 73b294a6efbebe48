pub mod category;
pub mod like;
pub mod post;
pub mod read_record;
pub mod reply;
pub mod status;

pub use category::{CategoryStatus, Entity as Category, Model as CategoryModel};
pub use like::{Entity as Like, LikeTarget, Model as LikeModel};
pub use post::{Entity as Post, Model as PostModel, RequiredPlan};
pub use read_record::{Entity as ReadRecord, Model as ReadRecordModel};
pub use reply::{Entity as Reply, Model as ReplyModel};
pub use status::ContentStatus;
