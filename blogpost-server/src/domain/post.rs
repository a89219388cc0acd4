use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::CommentView;
use super::error::DomainError;
use super::ownership::Owned;
use super::user::AuthorSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Owned for Post {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostWithAuthor {
    pub(crate) post: Post,
    pub(crate) author: AuthorSummary,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) author: AuthorSummary,
    pub(crate) comments: Vec<CommentView>,
}

/// Path segment of `GET /api/blog/{id_or_slug}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PostLookup {
    Id(i64),
    Slug(String),
}

impl PostLookup {
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Self::Id(id),
            _ => Self::Slug(raw.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) body: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            body: normalize_body(&self.body)?,
        })
    }
}

/// Title and slug are fixed at creation, only the body is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) body: String,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            body: normalize_body(&self.body)?,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        slug: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        user_id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("user_id", user_id)?;
        let slug = slug.into();
        if slug.is_empty() {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must not be empty",
            });
        }
        let title = normalize_title(&title.into())?;
        let body = normalize_body(&body.into())?;

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            slug,
            title,
            body,
            user_id,
            created_at,
            updated_at,
        })
    }
}

/// Lowercases, turns whitespace runs into `-` and drops every character
/// that is not a word character or `-`.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            slug.push(ch);
        }
    }

    slug
}

pub(crate) fn slug_for_title(title: &str) -> Result<String, DomainError> {
    let slug = slugify(title);
    if slug.trim_matches('-').is_empty() {
        return Err(DomainError::Validation {
            field: "title",
            message: "must contain at least one letter or digit",
        });
    }
    Ok(slug)
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

pub(crate) fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 250 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..250 chars",
        });
    }
    Ok(title.to_string())
}

pub(crate) fn normalize_body(body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field: "body",
            message: "must not be empty",
        });
    }
    Ok(body.to_string())
}
