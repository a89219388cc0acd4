use tracing::info;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::comment::{Comment, CommentView, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::ownership::ensure_owner;
use crate::domain::pagination::Pagination;
use crate::domain::post::{
    CreatePostRequest, Post, PostDetail, PostLookup, PostWithAuthor, UpdatePostRequest,
    slug_for_title,
};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) pagination: Pagination,
    pub(crate) total: i64,
}

pub(crate) struct BlogService<P: PostRepository, C: CommentRepository> {
    posts: P,
    comments: C,
}

impl<P: PostRepository, C: CommentRepository> BlogService<P, C> {
    pub(crate) fn new(posts: P, comments: C) -> Self {
        Self { posts, comments }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let slug = slug_for_title(&req.title)?;

        let new_post = NewPost {
            slug,
            title: req.title,
            body: req.body,
            user_id: author_id,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, slug = %post.slug, author_id, "post created");
        Ok(post)
    }

    /// Числовой путь сначала ищется как id, затем как slug.
    pub(crate) async fn get_post_detail(&self, raw: &str) -> Result<PostDetail, DomainError> {
        let found = match PostLookup::parse(raw) {
            PostLookup::Id(id) => match self.posts.find_by_id_with_author(id).await? {
                Some(found) => Some(found),
                None => self.posts.find_by_slug_with_author(&id.to_string()).await?,
            },
            PostLookup::Slug(slug) => self.posts.find_by_slug_with_author(&slug).await?,
        };
        let PostWithAuthor { post, author } =
            found.ok_or_else(|| DomainError::NotFound(format!("post: {}", raw.trim())))?;

        let comments = self.comments.list_for_post(post.id).await?;
        Ok(PostDetail {
            post,
            author,
            comments,
        })
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let patch = PostPatch { body: req.body };
        let guard = |post: &Post| ensure_owner(post, actor_user_id);

        self.posts
            .update_post(post_id, patch, &guard)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let guard = |post: &Post| ensure_owner(post, actor_user_id);

        let deleted = self.posts.delete_post(post_id, &guard).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        info!(post_id, actor_user_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn list_posts(
        &self,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let posts = self.posts.list_posts(pagination).await?;
        let total = self.posts.total_posts().await?;

        Ok(ListPostsResult {
            posts,
            pagination,
            total,
        })
    }

    pub(crate) async fn list_posts_by_author(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<ListPostsResult, DomainError> {
        let posts = self.posts.list_posts_by_author(user_id, pagination).await?;
        let total = self.posts.total_posts_by_author(user_id).await?;

        Ok(ListPostsResult {
            posts,
            pagination,
            total,
        })
    }

    pub(crate) async fn add_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.ensure_post_exists(post_id).await?;

        self.comments
            .create_comment(NewComment {
                message: req.message,
                user_id: actor_user_id,
                post_id,
            })
            .await
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        self.ensure_post_exists(post_id).await?;
        self.comments.list_for_post(post_id).await
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .map(|_| ())
            .ok_or(DomainError::NotFound(format!("post id: {post_id}")))
    }
}
