use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::MutationGuard;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::draft_repository::{DraftPatch, DraftRepository, NewDraft};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::comment::{Comment, CommentView};
use crate::domain::draft::Draft;
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::post::{Post, PostWithAuthor};
use crate::domain::user::{AuthorSummary, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::mailer::{MailError, Mailer, OutgoingEmail};
use crate::infrastructure::settings::TokenTtls;

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

pub(crate) fn test_jwt() -> JwtService {
    JwtService::new(TEST_SECRET, TokenTtls::default())
}

pub(crate) fn sample_user(id: i64, username: &str) -> User {
    User {
        id,
        full_name: format!("{username} tester"),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        is_active: true,
        is_confirmed: true,
        last_login: None,
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    /// Достаёт токен из ссылки вида `...{marker}{token}"`.
    pub(crate) fn extract_token(html: &str, marker: &str) -> Option<String> {
        let start = html.find(marker)? + marker.len();
        let rest = &html[start..];
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Address(email.to_email));
        }
        self.sent.lock().expect("sent mutex poisoned").push(email);
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    users: Vec<(User, String)>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    drafts: Vec<Draft>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn author(&self, user_id: i64) -> Option<AuthorSummary> {
        self.users
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| AuthorSummary {
                full_name: user.full_name.clone(),
                username: user.username.clone(),
            })
    }

    fn with_author(&self, post: &Post) -> Option<PostWithAuthor> {
        self.author(post.user_id).map(|author| PostWithAuthor {
            post: post.clone(),
            author,
        })
    }

    fn update_user(&mut self, id: i64, apply: impl FnOnce(&mut User, &mut String)) -> Option<User> {
        let (user, hash) = self.users.iter_mut().find(|(user, _)| user.id == id)?;
        apply(user, hash);
        Some(user.clone())
    }
}

/// In-memory stand-in for the Postgres repositories, mirrors their
/// unique-key and ordering rules.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub(crate) fn set_active(&self, user_id: i64, is_active: bool) {
        self.lock()
            .update_user(user_id, |user, _| user.is_active = is_active);
    }
}

fn page<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.skip as usize)
        .take(pagination.limit as usize)
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|(u, _)| u.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.iter().any(|(u, _)| u.email == input.email) {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }
        let user = User {
            id: state.next_id(),
            full_name: input.full_name,
            username: input.username,
            email: input.email,
            is_active: true,
            is_confirmed: false,
            last_login: None,
            created_at: Utc::now(),
        };
        state.users.push((user.clone(), input.password_hash));
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn record_login(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .update_user(id, |user, _| user.last_login = Some(Utc::now())))
    }

    async fn mark_confirmed(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.lock().update_user(id, |user, _| user.is_confirmed = true))
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .update_user(id, |_, hash| *hash = password_hash.to_string()))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if state.posts.iter().any(|p| p.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        if state.author(input.user_id).is_none() {
            return Err(DomainError::NotFound("author".to_string()));
        }
        let now = Utc::now();
        let post = Post {
            id: state.next_id(),
            slug: input.slug,
            title: input.title,
            body: input.body,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_id_with_author(&self, id: i64) -> Result<Option<PostWithAuthor>, DomainError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| state.with_author(p)))
    }

    async fn find_by_slug_with_author(
        &self,
        slug: &str,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .and_then(|p| state.with_author(p)))
    }

    async fn update_post(
        &self,
        id: i64,
        patch: PostPatch,
        guard: MutationGuard<'_, Post>,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        guard(&*post)?;
        post.body = patch.body;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64, guard: MutationGuard<'_, Post>) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let Some(post) = state.posts.iter().find(|p| p.id == id) else {
            return Ok(false);
        };
        guard(post)?;
        state.posts.retain(|p| p.id != id);
        state.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError> {
        let mut posts = self.lock().posts.clone();
        posts.reverse();
        Ok(page(posts, pagination))
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        Ok(self.lock().posts.len() as i64)
    }

    async fn list_posts_by_author(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let posts: Vec<Post> = self
            .lock()
            .posts
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(posts, pagination))
    }

    async fn total_posts_by_author(&self, user_id: i64) -> Result<i64, DomainError> {
        Ok(self.lock().posts.iter().filter(|p| p.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|p| p.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        let comment = Comment {
            id: state.next_id(),
            message: input.message,
            user_id: input.user_id,
            post_id: input.post_id,
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let state = self.lock();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                state.author(c.user_id).map(|author| CommentView {
                    comment: c.clone(),
                    author,
                })
            })
            .collect())
    }
}

#[async_trait]
impl DraftRepository for InMemoryStore {
    async fn create_draft(&self, input: NewDraft) -> Result<Draft, DomainError> {
        let mut state = self.lock();
        let now = Utc::now();
        let draft = Draft {
            id: state.next_id(),
            title: input.title,
            body: input.body,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        state.drafts.push(draft.clone());
        Ok(draft)
    }

    async fn get_draft(&self, id: i64) -> Result<Option<Draft>, DomainError> {
        Ok(self.lock().drafts.iter().find(|d| d.id == id).cloned())
    }

    async fn update_draft(
        &self,
        id: i64,
        patch: DraftPatch,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<Option<Draft>, DomainError> {
        let mut state = self.lock();
        let Some(draft) = state.drafts.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        guard(&*draft)?;
        if let Some(title) = patch.title {
            draft.title = title;
        }
        if let Some(body) = patch.body {
            draft.body = body;
        }
        draft.updated_at = Utc::now();
        Ok(Some(draft.clone()))
    }

    async fn delete_draft(
        &self,
        id: i64,
        guard: MutationGuard<'_, Draft>,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let Some(draft) = state.drafts.iter().find(|d| d.id == id) else {
            return Ok(false);
        };
        guard(draft)?;
        state.drafts.retain(|d| d.id != id);
        Ok(true)
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<Draft>, DomainError> {
        let drafts: Vec<Draft> = self
            .lock()
            .drafts
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(drafts, pagination))
    }

    async fn total_by_owner(&self, user_id: i64) -> Result<i64, DomainError> {
        Ok(self.lock().drafts.iter().filter(|d| d.user_id == user_id).count() as i64)
    }
}

/// Дожидается фоновых задач отправки писем на current-thread рантайме.
pub(crate) async fn wait_for_mail(mailer: &RecordingMailer, expected: usize) -> Vec<OutgoingEmail> {
    for _ in 0..100 {
        let sent = mailer.sent();
        if sent.len() >= expected {
            return sent;
        }
        tokio::task::yield_now().await;
    }
    mailer.sent()
}
