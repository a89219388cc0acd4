pub(crate) mod comment;
pub(crate) mod draft;
pub(crate) mod error;
pub(crate) mod ownership;
pub(crate) mod pagination;
pub(crate) mod post;
pub(crate) mod user;
