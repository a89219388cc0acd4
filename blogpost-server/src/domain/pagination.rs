use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) skip: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    pub(crate) const DEFAULT_LIMIT: u32 = 10;
    pub(crate) const MAX_LIMIT: u32 = 100;

    pub(crate) fn new(skip: Option<u32>, limit: Option<u32>) -> Result<Self, DomainError> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(DomainError::Validation {
                field: "limit",
                message: "must be 1..100",
            });
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit,
        })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
