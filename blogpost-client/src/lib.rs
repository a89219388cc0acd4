//! Клиентская библиотека для работы с `blogpost-server` по HTTP.
//!
//! Предоставляет единый API (`BlogClient`) поверх REST-эндпоинтов сервера.
//! Клиент хранит пару токенов после `login` и автоматически использует
//! access token в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{
    Author, Comment, Draft, ListDraftsResponse, ListPostsResponse, PasswordReset, Post,
    PostDetail, Tokens, User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct BlogClient {
    http_client: HttpClient,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            access_token: None,
            refresh_token: None,
        })
    }

    /// Устанавливает токены вручную, например после чтения из файла.
    pub fn set_tokens(&mut self, access_token: impl Into<String>, refresh_token: Option<String>) {
        self.access_token = Some(access_token.into());
        self.refresh_token = refresh_token;
    }

    /// Возвращает текущий access token, если он установлен.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Возвращает текущий refresh token, если он установлен.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Очищает сохранённые токены.
    pub fn clear_tokens(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }

    /// Регистрирует пользователя. Аккаунт остаётся неподтверждённым, пока
    /// не будет вызван `confirm_email` с токеном из письма.
    pub async fn register(
        &self,
        full_name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<User> {
        self.http_client
            .register(full_name, username, email, password)
            .await
    }

    /// Подтверждает email по токену из письма.
    pub async fn confirm_email(&self, token: &str) -> BlogClientResult<String> {
        self.http_client.confirm_email(token).await
    }

    /// Выполняет вход и сохраняет полученную пару токенов в клиенте.
    pub async fn login(&mut self, username: &str, password: &str) -> BlogClientResult<Tokens> {
        let tokens = self.http_client.login(username, password).await?;
        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
        Ok(tokens)
    }

    /// Получает новый access token по сохранённому refresh token.
    pub async fn refresh(&mut self) -> BlogClientResult<String> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or_else(|| BlogClientError::Unauthorized("refresh token is not set".to_string()))?;
        let access_token = self.http_client.refresh(refresh_token).await?;
        self.access_token = Some(access_token.clone());
        Ok(access_token)
    }

    /// Запрашивает письмо со ссылкой на сброс пароля.
    pub async fn forgot_password(&self, email: &str) -> BlogClientResult<String> {
        self.http_client.forgot_password(email).await
    }

    /// Устанавливает новый пароль по токену сброса.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> BlogClientResult<PasswordReset> {
        self.http_client.reset_password(reset_token, password).await
    }

    /// Возвращает страницу опубликованных постов, новые первыми.
    pub async fn list_posts(&self, skip: u32, limit: u32) -> BlogClientResult<ListPostsResponse> {
        self.http_client.list_posts(skip, limit).await
    }

    /// Возвращает пост с автором и комментариями по id или slug.
    pub async fn get_post(&self, id_or_slug: &str) -> BlogClientResult<PostDetail> {
        self.http_client.get_post(id_or_slug).await
    }

    /// Публикует новый пост.
    ///
    /// Требует установленный access token.
    pub async fn create_post(&self, title: &str, body: &str) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, title, body).await
    }

    /// Заменяет текст поста. Заголовок и slug не меняются.
    ///
    /// Требует установленный access token.
    pub async fn update_post(&self, id: i64, body: &str) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.update_post(token, id, body).await
    }

    /// Удаляет пост вместе с комментариями.
    ///
    /// Требует установленный access token.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_post(token, id).await
    }

    /// Возвращает посты текущего пользователя.
    pub async fn my_posts(&self, skip: u32, limit: u32) -> BlogClientResult<ListPostsResponse> {
        let token = self.require_token()?;
        self.http_client.my_posts(token, skip, limit).await
    }

    /// Возвращает комментарии к посту, старые первыми.
    pub async fn list_comments(&self, post_id: i64) -> BlogClientResult<Vec<Comment>> {
        self.http_client.list_comments(post_id).await
    }

    /// Оставляет комментарий к посту.
    pub async fn add_comment(&self, post_id: i64, message: &str) -> BlogClientResult<Comment> {
        let token = self.require_token()?;
        self.http_client.add_comment(token, post_id, message).await
    }

    /// Возвращает черновики текущего пользователя.
    pub async fn list_drafts(&self, skip: u32, limit: u32) -> BlogClientResult<ListDraftsResponse> {
        let token = self.require_token()?;
        self.http_client.list_drafts(token, skip, limit).await
    }

    /// Возвращает черновик по идентификатору.
    pub async fn get_draft(&self, id: i64) -> BlogClientResult<Draft> {
        let token = self.require_token()?;
        self.http_client.get_draft(token, id).await
    }

    /// Создаёт черновик.
    pub async fn create_draft(&self, title: &str, body: &str) -> BlogClientResult<Draft> {
        let token = self.require_token()?;
        self.http_client.create_draft(token, title, body).await
    }

    /// Частично обновляет черновик. Отсутствующие поля не меняются.
    pub async fn update_draft(
        &self,
        id: i64,
        title: Option<&str>,
        body: Option<&str>,
    ) -> BlogClientResult<Draft> {
        let token = self.require_token()?;
        self.http_client.update_draft(token, id, title, body).await
    }

    /// Удаляет черновик.
    pub async fn delete_draft(&self, id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_draft(token, id).await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| BlogClientError::Unauthorized("access token is not set".to_string()))
    }
}
