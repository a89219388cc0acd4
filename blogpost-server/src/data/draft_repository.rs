use async_trait::async_trait;

use super::MutationGuard;
use crate::domain::draft::Draft;
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;

#[derive(Debug, Clone)]
pub(crate) struct NewDraft {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) user_id: i64,
}

/// `None` keeps the stored column value.
#[derive(Debug, Clone, Default)]
pub(crate) struct DraftPatch {
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
}

#[async_trait]
pub(crate) trait DraftRepository: Send + Sync {
    async fn create_draft(&self, input: NewDraft) -> Result<Draft, DomainError>;
    async fn get_draft(&self, id: i64) -> Result<Option<Draft>, DomainError>;
    async fn update_draft(
        &self,
        id: i64,
        patch: DraftPatch,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<Option<Draft>, DomainError>;
    async fn delete_draft(
        &self,
        id: i64,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<bool, DomainError>;
    async fn list_by_owner(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Draft>, DomainError>;
    async fn total_by_owner(&self, user_id: i64) -> Result<i64, DomainError>;
}
