use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::MutationGuard;
use crate::data::draft_repository::{DraftPatch, DraftRepository, NewDraft};
use crate::domain::draft::Draft;
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;

const DRAFT_COLUMNS: &str = "id, title, body, user_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresDraftRepository {
    pool: PgPool,
}

impl PostgresDraftRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DraftRow {
    id: i64,
    title: String,
    body: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CountRow {
    count: i64,
}

impl From<DraftRow> for Draft {
    fn from(row: DraftRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DraftRepository for PostgresDraftRepository {
    async fn create_draft(&self, input: NewDraft) -> Result<Draft, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO drafts (title, body, user_id)
            VALUES ($1, $2, $3)
            RETURNING {DRAFT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DraftRow>(&sql)
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_draft_db_error)?;

        Ok(Draft::from(row))
    }

    async fn get_draft(&self, id: i64) -> Result<Option<Draft>, DomainError> {
        let sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = $1");
        let row = sqlx::query_as::<_, DraftRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_draft_db_error)?;

        Ok(row.map(Draft::from))
    }

    async fn update_draft(
        &self,
        id: i64,
        patch: DraftPatch,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<Option<Draft>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_draft_db_error)?;

        let locked_sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, DraftRow>(&locked_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_draft_db_error)?
        else {
            return Ok(None);
        };
        guard(&Draft::from(current))?;

        let update_sql = format!(
            r#"
            UPDATE drafts
            SET title = COALESCE($2, title),
                body = COALESCE($3, body),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DRAFT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DraftRow>(&update_sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.body.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_draft_db_error)?;

        tx.commit().await.map_err(map_draft_db_error)?;
        Ok(Some(Draft::from(row)))
    }

    async fn delete_draft(
        &self,
        id: i64,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_draft_db_error)?;

        let locked_sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, DraftRow>(&locked_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_draft_db_error)?
        else {
            return Ok(false);
        };
        guard(&Draft::from(current))?;

        let result = sqlx::query("DELETE FROM drafts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_draft_db_error)?;

        tx.commit().await.map_err(map_draft_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Draft>, DomainError> {
        let sql = format!(
            r#"
            SELECT {DRAFT_COLUMNS}
            FROM drafts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, DraftRow>(&sql)
            .bind(user_id)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.skip))
            .fetch_all(&self.pool)
            .await
            .map_err(map_draft_db_error)?;

        Ok(rows.into_iter().map(Draft::from).collect())
    }

    async fn total_by_owner(&self, user_id: i64) -> Result<i64, DomainError> {
        let row =
            sqlx::query_as::<_, CountRow>("SELECT COUNT(*) AS count FROM drafts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_draft_db_error)?;

        Ok(row.count)
    }
}

fn map_draft_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
