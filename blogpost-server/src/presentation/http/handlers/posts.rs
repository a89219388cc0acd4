use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::comments::CommentDto;
use crate::application::blog_service::ListPostsResult;
use crate::domain::pagination::Pagination;
use crate::domain::post::{CreatePostRequest, Post, PostDetail, UpdatePostRequest};
use crate::domain::user::AuthorSummary;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 250))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
}

/// Заголовок и slug неизменяемы, заменяется только текст.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1))]
    pub(crate) body: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PaginationQuery {
    /// Offset from the beginning (>= 0)
    pub(crate) skip: Option<u32>,
    /// Items per page (1..=100)
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
}

impl PaginationQuery {
    pub(crate) fn into_pagination(self) -> AppResult<Pagination> {
        self.validate()?;
        Ok(Pagination::new(self.skip, self.limit)?)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) full_name: String,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) skip: u32,
    pub(crate) limit: u32,
    pub(crate) total: i64,
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            full_name: author.full_name,
            username: author.username,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            body: post.body,
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        let PostDetail {
            post,
            author,
            comments,
        } = detail;
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            body: post.body,
            author: author.into(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            comments: comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            skip: result.pagination.skip,
            limit: result.pagination.limit,
            total: result.total,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/blog",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let pagination = query.into_pagination()?;
    let result = state.blog_service.list_posts(pagination).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/blog/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id or slug")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let detail = state.blog_service.get_post_detail(&id_or_slug).await?;

    Ok((StatusCode::OK, Json(PostDetailDto::from(detail))))
}

#[utoipa::path(
    post,
    path = "/api/blog",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error or duplicate slug"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        body: dto.body,
    };

    let result = state.blog_service.create_post(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    patch,
    path = "/api/blog/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest { body: dto.body };

    let result = state
        .blog_service
        .update_post(auth.user_id, id, req)
        .await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/blog/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.blog_service.delete_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/me/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Caller's posts, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn my_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    let pagination = query.into_pagination()?;
    let result = state
        .blog_service
        .list_posts_by_author(auth.user_id, pagination)
        .await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}
