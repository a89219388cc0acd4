use sqlx::PgPool;
use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::draft_service::DraftService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::draft_repository::PostgresDraftRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;

pub(crate) mod http;

pub(crate) type AppAuthService = AuthService<PostgresUserRepository>;
pub(crate) type AppBlogService = BlogService<PostgresPostRepository, PostgresCommentRepository>;
pub(crate) type AppDraftService = DraftService<PostgresDraftRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) blog_service: Arc<AppBlogService>,
    pub(crate) draft_service: Arc<AppDraftService>,
}

impl AppState {
    pub(crate) fn new(
        pool: PgPool,
        auth_service: Arc<AppAuthService>,
        blog_service: Arc<AppBlogService>,
        draft_service: Arc<AppDraftService>,
    ) -> Self {
        Self {
            pool,
            auth_service,
            blog_service,
            draft_service,
        }
    }
}
