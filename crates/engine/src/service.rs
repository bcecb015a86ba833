use chrono::Utc;
use domain::{tree, Comment, CommentId, CommentNode, PostId, UserId};
use std::collections::HashSet;
use storage::Db;
use tracing::{error, info, warn};

use crate::error::CommentError;

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create_comment(
        &self,
        post_id: &PostId,
        author_id: &UserId,
        content: &str,
        parent_id: Option<&CommentId>,
    ) -> Result<Comment, CommentError> {
        let content = normalize_content(content)?;
        let parent_id = self.validate_parent(post_id, parent_id).await?;

        let now = Utc::now().naive_utc();
        let comment = Comment {
            id: fresh_comment_id(),
            post_id: post_id.clone(),
            author_id: author_id.clone(),
            parent_id,
            content,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_comment(&comment).await?;

        info!("Created comment {} on post {}", comment.id, comment.post_id);
        Ok(comment)
    }

    // 父评论校验：只读检查，插入紧随其后。检查与插入不要求原子，
    // 与并发级联删除的竞态由读路径的悬空父节点策略兜底
    async fn validate_parent(
        &self,
        post_id: &PostId,
        parent_id: Option<&CommentId>,
    ) -> Result<Option<CommentId>, CommentError> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };

        let parent = self
            .db
            .get_comment(parent_id)
            .await?
            .ok_or(CommentError::ParentNotFound)?;

        if parent.post_id != *post_id {
            return Err(CommentError::ParentPostMismatch);
        }
        Ok(Some(parent.id))
    }

    pub async fn list_comments_for_post(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CommentNode>, CommentError> {
        let rows = self.db.list_comments_for_post(post_id).await?;

        {
            let ids: HashSet<&CommentId> = rows.iter().map(|c| &c.id).collect();
            let dangling = rows
                .iter()
                .filter(|c| c.parent_id.as_ref().is_some_and(|p| !ids.contains(p)))
                .count();
            if dangling > 0 {
                warn!(
                    "Post {} has {} comment(s) with a dangling parent, promoting to roots",
                    post_id, dangling
                );
            }
        }

        Ok(tree::build_comment_tree(rows))
    }

    pub async fn update_comment(
        &self,
        id: &CommentId,
        author_id: &UserId,
        new_content: &str,
    ) -> Result<Comment, CommentError> {
        self.authorize(id, author_id).await?;
        let content = normalize_content(new_content)?;

        let now = Utc::now().naive_utc();
        let touched = self.db.update_comment_content(id, &content, now).await?;
        if !touched {
            // 授权检查之后行被并发删除
            return Err(CommentError::NotFound);
        }

        self.db
            .get_comment(id)
            .await?
            .ok_or(CommentError::NotFound)
    }

    pub async fn delete_comment(
        &self,
        id: &CommentId,
        author_id: &UserId,
    ) -> Result<u64, CommentError> {
        self.authorize(id, author_id).await?;

        let deleted = self.cascade_delete(id).await?;
        info!("Cascade deleted {} comment(s) rooted at {}", deleted, id);
        Ok(deleted)
    }

    pub async fn delete_all_for_post(&self, post_id: &PostId) -> Result<(), CommentError> {
        let removed = self.db.delete_comments_for_post(post_id).await?;
        info!("Removed {} comment(s) while deleting post {}", removed, post_id);
        Ok(())
    }

    // 纯守卫：只读，不对评论加锁
    async fn authorize(
        &self,
        id: &CommentId,
        author_id: &UserId,
    ) -> Result<Comment, CommentError> {
        let comment = self
            .db
            .get_comment(id)
            .await?
            .ok_or(CommentError::NotFound)?;

        if comment.author_id != *author_id {
            return Err(CommentError::Forbidden);
        }
        Ok(comment)
    }

    // 级联删除：先用显式工作队列广度优先收集整棵子树，再按发现顺序
    // 的逆序逐行删除，后代总是先于祖先消失
    async fn cascade_delete(&self, root: &CommentId) -> Result<u64, CommentError> {
        let mut order = vec![root.clone()];
        let mut seen: HashSet<CommentId> = order.iter().cloned().collect();
        let mut cursor = 0;
        while cursor < order.len() {
            for reply in self.db.list_reply_ids(&order[cursor]).await? {
                // 脏数据成环时防止队列无限膨胀
                if seen.insert(reply.clone()) {
                    order.push(reply);
                }
            }
            cursor += 1;
        }

        let mut deleted = 0u64;
        for id in order.iter().rev() {
            match self.db.delete_comment(id).await {
                Ok(n) => deleted += n,
                Err(source) => {
                    error!(
                        "Cascade deletion aborted at {} after {} row(s): {:?}",
                        id, deleted, source
                    );
                    return Err(CommentError::CascadeDeletionFailed { deleted, source });
                }
            }
        }
        Ok(deleted)
    }
}

fn normalize_content(raw: &str) -> Result<String, CommentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommentError::InvalidContent);
    }
    Ok(trimmed.to_string())
}

fn fresh_comment_id() -> CommentId {
    CommentId::new(format!("{:032x}", rand::random::<u128>()))
}
