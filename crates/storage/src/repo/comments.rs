use crate::{models::SqlComment, Db};
use chrono::NaiveDateTime;
use domain::{Comment, CommentId, PostId};

impl Db {
    pub async fn insert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        let likes = serde_json::to_string(&c.likes)?;

        sqlx::query(
            r#"
            INSERT INTO comments (
                id, post_id, author_id, parent_id,
                content, likes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(c.id.as_str())
        .bind(c.post_id.as_str())
        .bind(c.author_id.as_str())
        .bind(c.parent_id.as_ref().map(|p| p.as_str()))
        .bind(&c.content)
        .bind(likes)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_comment(&self, id: &CommentId) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, post_id, author_id, parent_id,
                   content, likes, created_at, updated_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    // 一个帖子的全部评论，创建时间升序，id 兜底保证稳定排序
    pub async fn list_comments_for_post(&self, post_id: &PostId) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(
            r#"
            SELECT id, post_id, author_id, parent_id,
                   content, likes, created_at, updated_at
            FROM comments
            WHERE post_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_reply_ids(&self, parent_id: &CommentId) -> anyhow::Result<Vec<CommentId>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT id FROM comments
            WHERE parent_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(parent_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| CommentId::new(id)).collect())
    }

    pub async fn update_comment_content(
        &self,
        id: &CommentId,
        content: &str,
        updated_at: NaiveDateTime,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE comments
            SET content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content)
        .bind(updated_at)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_comment(&self, id: &CommentId) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected())
    }

    pub async fn delete_comments_for_post(&self, post_id: &PostId) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id.as_str())
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Bulk delete removed {} comment rows for post {}",
            res.rows_affected(),
            post_id
        );
        Ok(res.rows_affected())
    }
}
