use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::user::AuthorSummary;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    message: String,
    user_id: i64,
    post_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_full_name: String,
    author_username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            message: row.message,
            user_id: row.user_id,
            post_id: row.post_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (message, user_id, post_id)
            VALUES ($1, $2, $3)
            RETURNING id, message, user_id, post_id, created_at
            "#,
        )
        .bind(&input.message)
        .bind(input.user_id)
        .bind(input.post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(Comment::from(row))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT
                c.id,
                c.message,
                c.user_id,
                c.post_id,
                c.created_at,
                u.full_name AS author_full_name,
                u.username AS author_username
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CommentView {
                comment: Comment::from(row.comment),
                author: AuthorSummary {
                    full_name: row.author_full_name,
                    username: row.author_username,
                },
            })
            .collect())
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some(constraint) if constraint.contains("post_id") => "post",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
