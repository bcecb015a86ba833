mod models;
pub mod tree;

pub use models::{Comment, CommentId, CommentNode, PostId, UserId};
