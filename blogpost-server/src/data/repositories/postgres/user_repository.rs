use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

const USER_COLUMNS: &str =
    "id, full_name, username, email, is_active, is_confirmed, last_login, created_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, sql: &str, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    full_name: String,
    username: String,
    email: String,
    is_active: bool,
    is_confirmed: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            username: row.username,
            email: row.email,
            is_active: row.is_active,
            is_confirmed: row.is_confirmed,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO users (full_name, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&input.full_name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(User::from(row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_user(&sql, id).await
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserCredentialsRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(row.map(|r| UserCredentials {
            user: User::from(r.user),
            password_hash: r.password_hash,
        }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn record_login(&self, id: i64) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        self.fetch_user(&sql, id).await
    }

    async fn mark_confirmed(&self, id: i64) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "UPDATE users SET is_confirmed = TRUE WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        self.fetch_user(&sql, id).await
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "UPDATE users SET password_hash = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
