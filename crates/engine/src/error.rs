use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Content cannot be empty or whitespace only")]
    InvalidContent,

    #[error("Parent comment not found")]
    ParentNotFound,

    #[error("Parent comment must belong to the same post")]
    ParentPostMismatch,

    #[error("Comment not found")]
    NotFound,

    #[error("You can only modify your own comments")]
    Forbidden,

    // 级联删除中途失败：带上已删行数，由调用方决定重试还是上报不一致
    #[error("Cascade deletion aborted after deleting {deleted} comment(s)")]
    CascadeDeletionFailed {
        deleted: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
