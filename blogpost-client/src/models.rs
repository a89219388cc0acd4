use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Полное имя.
    pub full_name: String,
    /// Email.
    pub email: String,
    /// Логин.
    pub username: String,
    /// Активен ли аккаунт.
    pub is_active: bool,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пара токенов после успешного входа.
pub struct Tokens {
    /// Тип токена, всегда `Bearer`.
    pub token_type: String,
    /// Короткоживущий access token.
    pub access_token: String,
    /// Refresh token для получения нового access token.
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Краткие данные автора поста или комментария.
pub struct Author {
    /// Полное имя автора.
    pub full_name: String,
    /// Логин автора.
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Уникальный slug, построенный из заголовка.
    pub slug: String,
    /// Заголовок поста.
    pub title: String,
    /// Текст поста.
    pub body: String,
    /// Идентификатор автора.
    pub user_id: i64,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст комментария.
    pub message: String,
    /// Автор комментария.
    pub author: Author,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с автором и комментариями.
pub struct PostDetail {
    /// Идентификатор поста.
    pub id: i64,
    /// Slug поста.
    pub slug: String,
    /// Заголовок поста.
    pub title: String,
    /// Текст поста.
    pub body: String,
    /// Автор поста.
    pub author: Author,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
    /// Комментарии, от старых к новым.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка постов с параметрами пагинации.
pub struct ListPostsResponse {
    /// Список постов на текущей странице.
    pub posts: Vec<Post>,
    /// Смещение от начала выборки.
    pub skip: u32,
    /// Размер страницы.
    pub limit: u32,
    /// Общее количество постов.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Черновик, видимый только владельцу.
pub struct Draft {
    /// Идентификатор черновика.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub body: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка черновиков с параметрами пагинации.
pub struct ListDraftsResponse {
    /// Черновики на текущей странице.
    pub drafts: Vec<Draft>,
    /// Смещение от начала выборки.
    pub skip: u32,
    /// Размер страницы.
    pub limit: u32,
    /// Общее количество черновиков пользователя.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после сброса пароля.
pub struct PasswordReset {
    /// Сообщение сервера.
    pub message: String,
    /// Пользователь, чей пароль изменён.
    pub user: User,
}
