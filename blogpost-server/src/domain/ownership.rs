use super::error::DomainError;

/// Resource bound to exactly one creating user.
pub(crate) trait Owned {
    fn owner_id(&self) -> i64;

    fn belongs_to(&self, user_id: i64) -> bool {
        self.owner_id() == user_id
    }
}

/// Single authorization predicate for every mutating operation.
pub(crate) fn ensure_owner<T: Owned>(resource: &T, actor_user_id: i64) -> Result<(), DomainError> {
    if resource.belongs_to(actor_user_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
