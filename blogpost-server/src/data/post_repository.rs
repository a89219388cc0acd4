use async_trait::async_trait;

use super::MutationGuard;
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::post::{Post, PostWithAuthor};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) user_id: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) body: String,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn find_by_id_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn find_by_slug_with_author(
        &self,
        slug: &str,
    ) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn update_post(
        &self,
        id: i64,
        patch: PostPatch,
        guard: MutationGuard<'_, Post>,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64, guard: MutationGuard<'_, Post>) -> Result<bool, DomainError>;
    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError>;
    async fn total_posts(&self) -> Result<i64, DomainError>;
    async fn list_posts_by_author(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn total_posts_by_author(&self, user_id: i64) -> Result<i64, DomainError>;
}
