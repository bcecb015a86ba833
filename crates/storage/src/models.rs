use chrono::NaiveDateTime;
use domain::{Comment, CommentId, PostId, UserId};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub likes: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        // likes 列损坏时回退为空集合，读路径不因脏数据失败
        let likes: Vec<UserId> = serde_json::from_str(&sql.likes).unwrap_or_default();

        Comment {
            id: CommentId::new(sql.id),
            post_id: PostId::new(sql.post_id),
            author_id: UserId::new(sql.author_id),
            parent_id: sql.parent_id.map(CommentId::new),
            content: sql.content,
            likes,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}
