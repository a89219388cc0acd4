pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod drafts;
pub(crate) mod health;
pub(crate) mod posts;
