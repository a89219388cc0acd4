use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::posts::PaginationQuery;
use crate::application::draft_service::ListDraftsResult;
use crate::domain::draft::{CreateDraftRequest, Draft, UpdateDraftRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateDraftDto {
    #[validate(length(min = 1, max = 250))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
}

/// Пустые и отсутствующие поля не меняют черновик.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateDraftDto {
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DraftDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListDraftsResponseDto {
    pub(crate) drafts: Vec<DraftDto>,
    pub(crate) skip: u32,
    pub(crate) limit: u32,
    pub(crate) total: i64,
}

impl From<Draft> for DraftDto {
    fn from(draft: Draft) -> Self {
        Self {
            id: draft.id,
            title: draft.title,
            body: draft.body,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }
}

impl From<ListDraftsResult> for ListDraftsResponseDto {
    fn from(result: ListDraftsResult) -> Self {
        Self {
            drafts: result.drafts.into_iter().map(DraftDto::from).collect(),
            skip: result.pagination.skip,
            limit: result.pagination.limit,
            total: result.total,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/draft",
    tag = "drafts",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationQuery),
    responses(
        (status = 200, description = "Caller's drafts, newest first", body = ListDraftsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_drafts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListDraftsResponseDto>)> {
    let pagination = query.into_pagination()?;
    let result = state
        .draft_service
        .list_drafts(auth.user_id, pagination)
        .await?;

    Ok((StatusCode::OK, Json(ListDraftsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/draft/{id}",
    tag = "drafts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Draft id")
    ),
    responses(
        (status = 200, description = "Draft found", body = DraftDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Draft not found or not owned"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_draft(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<DraftDto>)> {
    let draft = state.draft_service.get_draft(auth.user_id, id).await?;
    Ok((StatusCode::OK, Json(DraftDto::from(draft))))
}

#[utoipa::path(
    post,
    path = "/api/draft",
    tag = "drafts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateDraftDto,
    responses(
        (status = 201, description = "Draft created", body = DraftDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_draft(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateDraftDto>,
) -> AppResult<(StatusCode, Json<DraftDto>)> {
    dto.validate()?;
    let req = CreateDraftRequest {
        title: dto.title,
        body: dto.body,
    };

    let draft = state.draft_service.create_draft(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(DraftDto::from(draft))))
}

#[utoipa::path(
    patch,
    path = "/api/draft/{id}",
    tag = "drafts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Draft id")
    ),
    request_body = UpdateDraftDto,
    responses(
        (status = 200, description = "Draft updated", body = DraftDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Draft not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_draft(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateDraftDto>,
) -> AppResult<(StatusCode, Json<DraftDto>)> {
    let req = UpdateDraftRequest {
        title: dto.title,
        body: dto.body,
    };

    let draft = state
        .draft_service
        .update_draft(auth.user_id, id, req)
        .await?;
    Ok((StatusCode::OK, Json(DraftDto::from(draft))))
}

#[utoipa::path(
    delete,
    path = "/api/draft/{id}",
    tag = "drafts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Draft id")
    ),
    responses(
        (status = 204, description = "Draft deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Draft not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_draft(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.draft_service.delete_draft(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
