use crate::domain::error::DomainError;

pub(crate) mod comment_repository;
pub(crate) mod draft_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

/// Check run against the locked row inside the mutating transaction.
/// An error aborts the mutation and rolls the transaction back.
pub(crate) type MutationGuard<'a, T> = &'a (dyn Fn(&T) -> Result<(), DomainError> + Send + Sync);
