use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::posts::AuthorDto;
use crate::domain::comment::{Comment, CommentView, CreateCommentRequest};
use crate::domain::user::AuthorSummary;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) message: String,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
}

impl CommentDto {
    fn new(comment: Comment, author: AuthorSummary) -> Self {
        Self {
            id: comment.id,
            message: comment.message,
            author: author.into(),
            created_at: comment.created_at,
        }
    }
}

impl From<CommentView> for CommentDto {
    fn from(view: CommentView) -> Self {
        Self::new(view.comment, view.author)
    }
}

#[utoipa::path(
    get,
    path = "/api/blog/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentDto]),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<Vec<CommentDto>>)> {
    let comments = state.blog_service.list_comments(post_id).await?;

    Ok((
        StatusCode::OK,
        Json(comments.into_iter().map(CommentDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/blog/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;
    let req = CreateCommentRequest {
        message: dto.message,
    };

    let comment = state
        .blog_service
        .add_comment(auth.user_id, post_id, req)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentDto::new(comment, auth.author_summary())),
    ))
}
