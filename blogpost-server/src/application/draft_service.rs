use crate::data::draft_repository::{DraftPatch, DraftRepository, NewDraft};
use crate::domain::draft::{CreateDraftRequest, Draft, UpdateDraftRequest};
use crate::domain::error::DomainError;
use crate::domain::ownership::{Owned, ensure_owner};
use crate::domain::pagination::Pagination;

#[derive(Debug, Clone)]
pub(crate) struct ListDraftsResult {
    pub(crate) drafts: Vec<Draft>,
    pub(crate) pagination: Pagination,
    pub(crate) total: i64,
}

/// Черновики видит только владелец: чужой черновик при чтении
/// неотличим от отсутствующего.
pub(crate) struct DraftService<R: DraftRepository> {
    repo: R,
}

impl<R: DraftRepository> DraftService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_drafts(
        &self,
        owner_id: i64,
        pagination: Pagination,
    ) -> Result<ListDraftsResult, DomainError> {
        let drafts = self.repo.list_by_owner(owner_id, pagination).await?;
        let total = self.repo.total_by_owner(owner_id).await?;
        Ok(ListDraftsResult {
            drafts,
            pagination,
            total,
        })
    }

    pub(crate) async fn get_draft(&self, owner_id: i64, draft_id: i64) -> Result<Draft, DomainError> {
        self.repo
            .get_draft(draft_id)
            .await?
            .filter(|draft| draft.belongs_to(owner_id))
            .ok_or(DomainError::NotFound(format!("draft id: {draft_id}")))
    }

    pub(crate) async fn create_draft(
        &self,
        owner_id: i64,
        req: CreateDraftRequest,
    ) -> Result<Draft, DomainError> {
        let req = req.validate()?;
        self.repo
            .create_draft(NewDraft {
                title: req.title,
                body: req.body,
                user_id: owner_id,
            })
            .await
    }

    pub(crate) async fn update_draft(
        &self,
        actor_user_id: i64,
        draft_id: i64,
        req: UpdateDraftRequest,
    ) -> Result<Draft, DomainError> {
        let req = req.validate()?;
        let patch = DraftPatch {
            title: req.title,
            body: req.body,
        };
        let guard = |draft: &Draft| ensure_owner(draft, actor_user_id);

        self.repo
            .update_draft(draft_id, patch, &guard)
            .await?
            .ok_or(DomainError::NotFound(format!("draft id: {draft_id}")))
    }

    pub(crate) async fn delete_draft(
        &self,
        actor_user_id: i64,
        draft_id: i64,
    ) -> Result<(), DomainError> {
        let guard = |draft: &Draft| ensure_owner(draft, actor_user_id);

        if !self.repo.delete_draft(draft_id, &guard).await? {
            return Err(DomainError::NotFound(format!("draft id: {draft_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DraftService;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::draft::{CreateDraftRequest, UpdateDraftRequest};
    use crate::domain::error::DomainError;
    use crate::domain::pagination::Pagination;
    use crate::test_support::InMemoryStore;

    async fn store_with_users() -> (InMemoryStore, i64, i64) {
        let store = InMemoryStore::default();
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = store
                .create_user(NewUser {
                    full_name: name.to_string(),
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password_hash: "hash".to_string(),
                })
                .await
                .expect("user must be created");
            ids.push(user.id);
        }
        (store, ids[0], ids[1])
    }

    fn draft(title: &str) -> CreateDraftRequest {
        CreateDraftRequest {
            title: title.to_string(),
            body: "draft body".to_string(),
        }
    }

    #[tokio::test]
    async fn drafts_are_listed_only_for_their_owner() {
        let (store, alice, bob) = store_with_users().await;
        let service = DraftService::new(store);

        service.create_draft(alice, draft("one")).await.expect("created");
        service.create_draft(alice, draft("two")).await.expect("created");
        service.create_draft(bob, draft("bobs")).await.expect("created");

        let listed = service
            .list_drafts(alice, Pagination::default())
            .await
            .expect("must list");
        assert_eq!(listed.total, 2);
        let titles: Vec<_> = listed.drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn foreign_draft_is_not_found_on_read_and_forbidden_on_write() {
        let (store, alice, bob) = store_with_users().await;
        let service = DraftService::new(store);
        let created = service.create_draft(alice, draft("secret")).await.expect("created");

        let err = service.get_draft(bob, created.id).await.expect_err("hidden");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service
            .update_draft(bob, created.id, UpdateDraftRequest {
                title: Some("mine now".to_string()),
                body: None,
            })
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        let err = service
            .delete_draft(bob, created.id)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        let kept = service.get_draft(alice, created.id).await.expect("still there");
        assert_eq!(kept.title, "secret");
    }

    #[tokio::test]
    async fn update_draft_keeps_fields_that_are_missing_or_blank() {
        let (store, alice, _) = store_with_users().await;
        let service = DraftService::new(store);
        let created = service.create_draft(alice, draft("title")).await.expect("created");

        let updated = service
            .update_draft(alice, created.id, UpdateDraftRequest {
                title: Some("   ".to_string()),
                body: Some("new body".to_string()),
            })
            .await
            .expect("must update");
        assert_eq!(updated.title, "title");
        assert_eq!(updated.body, "new body");

        let unchanged = service
            .update_draft(alice, created.id, UpdateDraftRequest::default())
            .await
            .expect("empty patch is allowed");
        assert_eq!(unchanged.title, "title");
        assert_eq!(unchanged.body, "new body");
    }

    #[tokio::test]
    async fn delete_draft_removes_it_for_owner() {
        let (store, alice, _) = store_with_users().await;
        let service = DraftService::new(store);
        let created = service.create_draft(alice, draft("gone")).await.expect("created");

        service.delete_draft(alice, created.id).await.expect("deleted");
        let err = service.get_draft(alice, created.id).await.expect_err("gone");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service.delete_draft(alice, created.id).await.expect_err("gone");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
