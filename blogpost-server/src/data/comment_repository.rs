use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) message: String,
    pub(crate) user_id: i64,
    pub(crate) post_id: i64,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError>;
}
