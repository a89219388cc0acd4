use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::ownership::Owned;
use super::post::{normalize_body, normalize_title};

#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Owned for Draft {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreateDraftRequest {
    pub(crate) title: String,
    pub(crate) body: String,
}

impl CreateDraftRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
        })
    }
}

/// Missing or blank fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateDraftRequest {
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
}

impl UpdateDraftRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = non_blank(self.title).map(|t| normalize_title(&t)).transpose()?;
        let body = non_blank(self.body).map(|b| normalize_body(&b)).transpose()?;
        Ok(Self { title, body })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
