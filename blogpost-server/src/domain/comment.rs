use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::user::AuthorSummary;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) message: String,
    pub(crate) user_id: i64,
    pub(crate) post_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentView {
    pub(crate) comment: Comment,
    pub(crate) author: AuthorSummary,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) message: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let message = self.message.trim();
        if message.is_empty() || message.chars().count() > 2000 {
            return Err(DomainError::Validation {
                field: "message",
                message: "must be 1..2000 chars",
            });
        }
        Ok(Self {
            message: message.to_string(),
        })
    }
}
