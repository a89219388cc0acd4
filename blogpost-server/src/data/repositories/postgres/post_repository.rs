use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::MutationGuard;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::post::{Post, PostWithAuthor};
use crate::domain::user::AuthorSummary;

const POST_COLUMNS: &str = "id, slug, title, body, user_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_with_author(
        &self,
        filter: &str,
        value: PostFilterValue<'_>,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        let sql = format!(
            r#"
            SELECT
                p.id,
                p.slug,
                p.title,
                p.body,
                p.user_id,
                p.created_at,
                p.updated_at,
                u.full_name AS author_full_name,
                u.username AS author_username
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE {filter}
            "#
        );
        let query = sqlx::query_as::<_, PostWithAuthorRow>(&sql);
        let query = match value {
            PostFilterValue::Id(id) => query.bind(id),
            PostFilterValue::Slug(slug) => query.bind(slug),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(|r| {
            Ok(PostWithAuthor {
                post: map_row_to_post(r.post)?,
                author: AuthorSummary {
                    full_name: r.author_full_name,
                    username: r.author_username,
                },
            })
        })
        .transpose()
    }
}

enum PostFilterValue<'a> {
    Id(i64),
    Slug(&'a str),
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    slug: String,
    title: String,
    body: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostWithAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_full_name: String,
    author_username: String,
}

#[derive(sqlx::FromRow)]
struct CountRow {
    count: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts (slug, title, body, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_by_id_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, DomainError> {
        self.find_with_author("p.id = $1", PostFilterValue::Id(id))
            .await
    }

    async fn find_by_slug_with_author(
        &self,
        slug: &str,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        self.find_with_author("p.slug = $1", PostFilterValue::Slug(slug))
            .await
    }

    async fn update_post(
        &self,
        id: i64,
        patch: PostPatch,
        guard: MutationGuard<'_, Post>,
    ) -> Result<Option<Post>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let locked_sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, PostRow>(&locked_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_post_db_error)?
        else {
            return Ok(None);
        };
        guard(&map_row_to_post(current)?)?;

        let update_sql = format!(
            r#"
            UPDATE posts
            SET body = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&update_sql)
            .bind(id)
            .bind(&patch.body)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;
        map_row_to_post(row).map(Some)
    }

    async fn delete_post(&self, id: i64, guard: MutationGuard<'_, Post>) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let locked_sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, PostRow>(&locked_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_post_db_error)?
        else {
            return Ok(false);
        };
        guard(&map_row_to_post(current)?)?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            OFFSET $2
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.skip))
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        let row = sqlx::query_as::<_, CountRow>("SELECT COUNT(*) AS count FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(row.count)
    }

    async fn list_posts_by_author(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.skip))
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn total_posts_by_author(&self, user_id: i64) -> Result<i64, DomainError> {
        let row =
            sqlx::query_as::<_, CountRow>("SELECT COUNT(*) AS count FROM posts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_post_db_error)?;

        Ok(row.count)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.slug,
        row.title,
        row.body,
        row.user_id,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("slug".to_string());
            }
            Some("23503") => return DomainError::NotFound("author".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
