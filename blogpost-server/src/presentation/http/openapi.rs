use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{
    LoginForm, LoginResponseDto, MessageDto, PasswordResetDto, PasswordResetResponseDto,
    RefreshTokenDto, RefreshTokenResponseDto, RegisterDto, UserDto,
};
use crate::presentation::http::handlers::comments::{CommentDto, CreateCommentDto};
use crate::presentation::http::handlers::drafts::{
    CreateDraftDto, DraftDto, ListDraftsResponseDto, UpdateDraftDto,
};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{
    AuthorDto, CreatePostDto, ListPostsResponseDto, PostDetailDto, PostDto, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::confirm_email,
        crate::presentation::http::handlers::auth::refresh_token,
        crate::presentation::http::handlers::auth::password_forgot_email,
        crate::presentation::http::handlers::auth::password_reset,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::my_posts,
        crate::presentation::http::handlers::comments::list_comments,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::drafts::list_drafts,
        crate::presentation::http::handlers::drafts::get_draft,
        crate::presentation::http::handlers::drafts::create_draft,
        crate::presentation::http::handlers::drafts::update_draft,
        crate::presentation::http::handlers::drafts::delete_draft
    ),
    components(
        schemas(
            HealthzResponse,
            RegisterDto,
            LoginForm,
            LoginResponseDto,
            RefreshTokenDto,
            RefreshTokenResponseDto,
            PasswordResetDto,
            PasswordResetResponseDto,
            MessageDto,
            UserDto,
            AuthorDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostDetailDto,
            ListPostsResponseDto,
            CreateCommentDto,
            CommentDto,
            CreateDraftDto,
            UpdateDraftDto,
            DraftDto,
            ListDraftsResponseDto
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration, login and account recovery"),
        (name = "posts", description = "Published posts"),
        (name = "comments", description = "Comments on posts"),
        (name = "drafts", description = "Private drafts of the caller")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn openapi_documents_every_public_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthz",
            "/api/auth/login",
            "/api/auth/confirm/{token}",
            "/api/blog",
            "/api/blog/{id}",
            "/api/blog/{id}/comments",
            "/api/me/posts",
            "/api/draft",
            "/api/draft/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is not documented");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
