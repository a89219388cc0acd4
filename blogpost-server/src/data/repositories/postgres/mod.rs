pub(crate) mod comment_repository;
pub(crate) mod draft_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;
