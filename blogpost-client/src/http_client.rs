use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{
    Comment, Draft, ListDraftsResponse, ListPostsResponse, PasswordReset, Post, PostDetail,
    Tokens, User,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    full_name: &'a str,
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshTokenRequestDto<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordQuery<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordResetRequestDto<'a> {
    reset_token: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdatePostRequestDto<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequestDto<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateDraftRequestDto<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateDraftRequestDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct PaginationQuery {
    skip: u32,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageDto {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponseDto {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ListPostsResponseDto {
    posts: Vec<Post>,
    skip: u32,
    limit: u32,
    total: i64,
}

#[derive(Debug, Deserialize)]
struct ListDraftsResponseDto {
    drafts: Vec<Draft>,
    skip: u32,
    limit: u32,
    total: i64,
}

impl From<ListPostsResponseDto> for ListPostsResponse {
    fn from(value: ListPostsResponseDto) -> Self {
        Self {
            posts: value.posts,
            skip: value.skip,
            limit: value.limit,
            total: value.total.max(0) as u64,
        }
    }
}

impl From<ListDraftsResponseDto> for ListDraftsResponse {
    fn from(value: ListDraftsResponseDto) -> Self {
        Self {
            drafts: value.drafts,
            skip: value.skip,
            limit: value.limit,
            total: value.total.max(0) as u64,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `blogpost-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        BlogClientError::from_http_status(status, Some(message))
    }

    async fn send(request: RequestBuilder) -> BlogClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// универсальный helper: отправка запроса и разбор json-ответа
    async fn fetch<TRes: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<TRes> {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    pub(crate) async fn register(
        &self,
        full_name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<User> {
        let payload = RegisterRequestDto {
            full_name,
            username,
            email,
            password,
        };
        Self::fetch(
            self.request(Method::POST, "/api/auth/register", None)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn confirm_email(&self, token: &str) -> BlogClientResult<String> {
        let dto: MessageDto = Self::fetch(self.request(
            Method::POST,
            &format!("/api/auth/confirm/{token}"),
            None,
        ))
        .await?;
        Ok(dto.message)
    }

    /// Вход через форму `application/x-www-form-urlencoded`.
    pub(crate) async fn login(&self, username: &str, password: &str) -> BlogClientResult<Tokens> {
        let form = LoginForm { username, password };
        Self::fetch(self.request(Method::POST, "/api/auth/login", None).form(&form)).await
    }

    pub(crate) async fn refresh(&self, refresh_token: &str) -> BlogClientResult<String> {
        let payload = RefreshTokenRequestDto { refresh_token };
        let dto: RefreshTokenResponseDto = Self::fetch(
            self.request(Method::POST, "/api/auth/refresh-token", None)
                .json(&payload),
        )
        .await?;
        Ok(dto.access_token)
    }

    pub(crate) async fn forgot_password(&self, email: &str) -> BlogClientResult<String> {
        let query = ForgotPasswordQuery { email };
        let dto: MessageDto = Self::fetch(
            self.request(Method::GET, "/api/auth/password-forgot-email", None)
                .query(&query),
        )
        .await?;
        Ok(dto.message)
    }

    pub(crate) async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> BlogClientResult<PasswordReset> {
        let payload = PasswordResetRequestDto {
            reset_token,
            password,
        };
        Self::fetch(
            self.request(Method::POST, "/api/auth/password-reset", None)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn list_posts(&self, skip: u32, limit: u32) -> BlogClientResult<ListPostsResponse> {
        let dto: ListPostsResponseDto = Self::fetch(
            self.request(Method::GET, "/api/blog", None)
                .query(&PaginationQuery { skip, limit }),
        )
        .await?;
        Ok(dto.into())
    }

    pub(crate) async fn get_post(&self, id_or_slug: &str) -> BlogClientResult<PostDetail> {
        Self::fetch(self.request(Method::GET, &format!("/api/blog/{id_or_slug}"), None)).await
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> BlogClientResult<Post> {
        let payload = CreatePostRequestDto { title, body };
        Self::fetch(
            self.request(Method::POST, "/api/blog", Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn update_post(&self, token: &str, id: i64, body: &str) -> BlogClientResult<Post> {
        let payload = UpdatePostRequestDto { body };
        Self::fetch(
            self.request(Method::PATCH, &format!("/api/blog/{id}"), Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/api/blog/{id}"), Some(token))).await?;
        Ok(())
    }

    pub(crate) async fn my_posts(
        &self,
        token: &str,
        skip: u32,
        limit: u32,
    ) -> BlogClientResult<ListPostsResponse> {
        let dto: ListPostsResponseDto = Self::fetch(
            self.request(Method::GET, "/api/me/posts", Some(token))
                .query(&PaginationQuery { skip, limit }),
        )
        .await?;
        Ok(dto.into())
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> BlogClientResult<Vec<Comment>> {
        Self::fetch(self.request(
            Method::GET,
            &format!("/api/blog/{post_id}/comments"),
            None,
        ))
        .await
    }

    pub(crate) async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        message: &str,
    ) -> BlogClientResult<Comment> {
        let payload = CreateCommentRequestDto { message };
        Self::fetch(
            self.request(
                Method::POST,
                &format!("/api/blog/{post_id}/comments"),
                Some(token),
            )
            .json(&payload),
        )
        .await
    }

    pub(crate) async fn list_drafts(
        &self,
        token: &str,
        skip: u32,
        limit: u32,
    ) -> BlogClientResult<ListDraftsResponse> {
        let dto: ListDraftsResponseDto = Self::fetch(
            self.request(Method::GET, "/api/draft", Some(token))
                .query(&PaginationQuery { skip, limit }),
        )
        .await?;
        Ok(dto.into())
    }

    pub(crate) async fn get_draft(&self, token: &str, id: i64) -> BlogClientResult<Draft> {
        Self::fetch(self.request(Method::GET, &format!("/api/draft/{id}"), Some(token))).await
    }

    pub(crate) async fn create_draft(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> BlogClientResult<Draft> {
        let payload = CreateDraftRequestDto { title, body };
        Self::fetch(
            self.request(Method::POST, "/api/draft", Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn update_draft(
        &self,
        token: &str,
        id: i64,
        title: Option<&str>,
        body: Option<&str>,
    ) -> BlogClientResult<Draft> {
        let payload = UpdateDraftRequestDto { title, body };
        Self::fetch(
            self.request(Method::PATCH, &format!("/api/draft/{id}"), Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn delete_draft(&self, token: &str, id: i64) -> BlogClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/api/draft/{id}"), Some(token))).await?;
        Ok(())
    }
}
