use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{debug, info};

use super::notification_service::NotificationService;
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, PasswordResetRequest, RegisterRequest, User, normalize_email};
use crate::infrastructure::jwt::{JwtError, JwtService, TokenKind};

#[derive(Debug, Clone)]
pub(crate) struct LoginResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AuthPolicy {
    /// Каждый запрос с access-токеном заново проверяет is_active/is_confirmed.
    pub(crate) recheck_account_state: bool,
    /// password-forgot отвечает одинаково, есть такой email или нет.
    pub(crate) uniform_forgot_response: bool,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: Arc<JwtService>,
    notifications: Arc<NotificationService>,
    policy: AuthPolicy,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(
        repo: R,
        jwt: Arc<JwtService>,
        notifications: Arc<NotificationService>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            repo,
            jwt,
            notifications,
            policy,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash);
        let user = self.repo.create_user(new_user).await?;
        info!(user_id = user.id, username = %user.username, "user registered");

        self.notifications.send_confirmation(&user);
        Ok(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<LoginResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // стремимся к одинаковому времени проверки если user не найден
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;
        user_creds.user.ensure_can_login()?;

        let user = self
            .repo
            .record_login(user_creds.user.id)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        let access_token = self.issue(user.id, TokenKind::Access)?;
        let refresh_token = self.issue(user.id, TokenKind::Refresh)?;
        info!(user_id = user.id, "user logged in");

        Ok(LoginResult {
            user,
            access_token,
            refresh_token,
        })
    }

    pub(crate) async fn confirm_email(&self, token: &str) -> Result<User, DomainError> {
        let user_id = self
            .jwt
            .decode(token.trim(), TokenKind::Confirm)
            .map_err(token_error)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Forbidden)?;
        if !user.is_active {
            return Err(DomainError::InactiveAccount);
        }
        if user.is_confirmed {
            return Ok(user);
        }

        let user = self
            .repo
            .mark_confirmed(user.id)
            .await?
            .ok_or(DomainError::Forbidden)?;
        info!(user_id = user.id, "email confirmed");
        Ok(user)
    }

    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        let user_id = self
            .jwt
            .decode(refresh_token.trim(), TokenKind::Refresh)
            .map_err(token_error)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::InvalidToken)?;
        if self.policy.recheck_account_state {
            user.ensure_can_login()?;
        }

        self.issue(user.id, TokenKind::Access)
    }

    pub(crate) async fn forgot_password(&self, email: &str) -> Result<(), DomainError> {
        let uniform = self.policy.uniform_forgot_response;

        let user = match normalize_email(email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(err) if !uniform => return Err(err),
            Err(_) => None,
        };

        let user = match user {
            Some(user) if user.is_active => user,
            _ if uniform => {
                debug!("password reset requested for unknown or inactive account");
                return Ok(());
            }
            Some(_) => return Err(DomainError::InactiveAccount),
            None => return Err(DomainError::Forbidden),
        };

        info!(user_id = user.id, "password reset requested");
        self.notifications.send_password_reset(&user);
        Ok(())
    }

    pub(crate) async fn reset_password(&self, req: PasswordResetRequest) -> Result<User, DomainError> {
        let req = req.validate()?;
        let user_id = self
            .jwt
            .decode(&req.reset_token, TokenKind::Reset)
            .map_err(token_error)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Forbidden)?;
        if !user.is_active {
            return Err(DomainError::InactiveAccount);
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .update_password_hash(user.id, &password_hash)
            .await?
            .ok_or(DomainError::Forbidden)?;
        info!(user_id = user.id, "password reset done");
        Ok(user)
    }

    /// Пользователь по access-токену из заголовка Authorization.
    pub(crate) async fn resolve_session(&self, access_token: &str) -> Result<User, DomainError> {
        let user_id = self
            .jwt
            .decode(access_token, TokenKind::Access)
            .map_err(token_error)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::InvalidToken)?;
        if self.policy.recheck_account_state {
            user.ensure_can_login()?;
        }
        Ok(user)
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn issue(&self, user_id: i64, kind: TokenKind) -> Result<String, DomainError> {
        self.jwt
            .issue(user_id, kind)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            full_name: req.full_name,
            username: req.username,
            email: req.email,
            password_hash,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

fn token_error(err: JwtError) -> DomainError {
    match err {
        JwtError::Encode(err) => DomainError::Unexpected(err.to_string()),
        err @ JwtError::TtlOutOfRange => DomainError::Unexpected(err.to_string()),
        other => {
            debug!(error = %other, "token rejected");
            DomainError::InvalidToken
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{AuthPolicy, AuthService};
    use crate::application::notification_service::{MailLinks, NotificationService};
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, PasswordResetRequest, RegisterRequest, User};
    use crate::infrastructure::jwt::{JwtService, TokenKind};
    use crate::test_support::{RecordingMailer, sample_user, test_jwt, wait_for_mail};

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
        user_by_id: Arc<Mutex<Option<User>>>,
        create_user_out: User,
    }

    impl FakeUserRepo {
        fn new(create_user_out: User) -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
                user_by_id: Arc::new(Mutex::new(None)),
                create_user_out,
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn set_user(&self, user: Option<User>) {
            *self.user_by_id.lock().expect("user mutex poisoned") = user;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }

        fn stored_user(&self) -> Option<User> {
            self.user_by_id.lock().expect("user mutex poisoned").clone()
        }

        fn update_user(&self, apply: impl FnOnce(&mut User)) -> Option<User> {
            let mut guard = self.user_by_id.lock().expect("user mutex poisoned");
            let user = guard.as_mut()?;
            apply(user);
            Some(user.clone())
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(self.create_user_out.clone())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(self.stored_user())
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
            Ok(self.stored_user())
        }

        async fn record_login(&self, _id: i64) -> Result<Option<User>, DomainError> {
            let creds = self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone();
            Ok(creds.map(|c| User {
                last_login: Some(chrono::Utc::now()),
                ..c.user
            }))
        }

        async fn mark_confirmed(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(self.update_user(|user| user.is_confirmed = true))
        }

        async fn update_password_hash(
            &self,
            _id: i64,
            _password_hash: &str,
        ) -> Result<Option<User>, DomainError> {
            Ok(self.stored_user())
        }
    }

    struct Harness {
        service: AuthService<FakeUserRepo>,
        repo: FakeUserRepo,
        jwt: Arc<JwtService>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness(policy: AuthPolicy) -> Harness {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user"));
        let jwt = Arc::new(test_jwt());
        let mailer = Arc::new(RecordingMailer::default());
        let notifications = Arc::new(NotificationService::new(
            mailer.clone(),
            Arc::clone(&jwt),
            MailLinks {
                public_base_url: "http://blog.test".to_string(),
                website_name: "Blogpost".to_string(),
            },
        ));
        Harness {
            service: AuthService::new(repo.clone(), Arc::clone(&jwt), notifications, policy),
            repo,
            jwt,
            mailer,
        }
    }

    fn with_password(h: &Harness, user: User, password: &str) {
        let hash = h.service.hash_password(password).expect("hash must be created");
        h.repo.set_login_credentials(Some(UserCredentials {
            user,
            password_hash: hash,
        }));
    }

    #[tokio::test]
    async fn register_creates_user_and_sends_confirmation() {
        let h = harness(AuthPolicy::default());

        let req = RegisterRequest {
            full_name: "  Valid User ".to_string(),
            username: "  valid_user  ".to_string(),
            email: "  VALID@EXAMPLE.COM  ".to_string(),
            password: "very-secure-password".to_string(),
        };

        let user = h.service.register(req).await.expect("register must succeed");
        assert_eq!(user.username, "valid_user");

        let created = h.repo.take_created_input().expect("create_user must be called");
        assert_eq!(created.full_name, "Valid User");
        assert_eq!(created.username, "valid_user");
        assert_eq!(created.email, "valid@example.com");
        assert!(created.password_hash.starts_with("$argon2id$"));
        assert_ne!(created.password_hash, "very-secure-password");

        let sent = wait_for_mail(&h.mailer, 1).await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html_body.contains("http://blog.test/api/auth/confirm/"));
    }

    #[tokio::test]
    async fn register_rejects_short_password_before_repo_call() {
        let h = harness(AuthPolicy::default());
        let req = RegisterRequest {
            full_name: "Valid User".to_string(),
            username: "valid_user".to_string(),
            email: "valid@example.com".to_string(),
            password: "short".to_string(),
        };

        let err = h.service.register(req).await.expect_err("must fail");
        assert!(matches!(err, DomainError::Validation { field: "password", .. }));
        assert!(h.repo.take_created_input().is_none());
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let h = harness(AuthPolicy::default());
        h.repo.set_login_credentials(None);

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "some-password".to_string(),
        };

        let err = h.service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let h = harness(AuthPolicy::default());
        with_password(&h, sample_user(1, "valid_user"), "correct-password");

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = h.service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_rejects_unconfirmed_account() {
        let h = harness(AuthPolicy::default());
        let user = User {
            is_confirmed: false,
            ..sample_user(1, "valid_user")
        };
        with_password(&h, user, "correct-password");

        let err = h
            .service
            .login(LoginRequest {
                username: "valid_user".to_string(),
                password: "correct-password".to_string(),
            })
            .await
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::UnconfirmedAccount));
    }

    #[tokio::test]
    async fn login_issues_access_and_refresh_tokens() {
        let h = harness(AuthPolicy::default());
        with_password(&h, sample_user(1, "valid_user"), "correct-password");

        let result = h
            .service
            .login(LoginRequest {
                username: "valid_user".to_string(),
                password: "correct-password".to_string(),
            })
            .await
            .expect("login must succeed");

        assert_eq!(result.user.id, 1);
        assert!(result.user.last_login.is_some());
        assert_eq!(h.jwt.decode(&result.access_token, TokenKind::Access).expect("access"), 1);
        assert_eq!(h.jwt.decode(&result.refresh_token, TokenKind::Refresh).expect("refresh"), 1);
        assert!(h.jwt.decode(&result.refresh_token, TokenKind::Access).is_err());
    }

    #[tokio::test]
    async fn confirm_email_marks_user_confirmed() {
        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(User {
            is_confirmed: false,
            ..sample_user(1, "valid_user")
        }));
        let token = h.jwt.issue(1, TokenKind::Confirm).expect("token");

        let user = h.service.confirm_email(&token).await.expect("must confirm");
        assert!(user.is_confirmed);
    }

    #[tokio::test]
    async fn confirm_email_rejects_access_token() {
        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(sample_user(1, "valid_user")));
        let token = h.jwt.issue(1, TokenKind::Access).expect("token");

        let err = h.service.confirm_email(&token).await.expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidToken));
    }

    #[tokio::test]
    async fn confirm_email_rejects_missing_and_inactive_users() {
        let h = harness(AuthPolicy::default());
        let token = h.jwt.issue(1, TokenKind::Confirm).expect("token");

        let err = h.service.confirm_email(&token).await.expect_err("no user");
        assert!(matches!(err, DomainError::Forbidden));

        h.repo.set_user(Some(User {
            is_active: false,
            ..sample_user(1, "valid_user")
        }));
        let err = h.service.confirm_email(&token).await.expect_err("inactive");
        assert!(matches!(err, DomainError::InactiveAccount));
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() {
        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(sample_user(1, "valid_user")));
        let refresh = h.jwt.issue(1, TokenKind::Refresh).expect("token");

        let access = h.service.refresh(&refresh).await.expect("must refresh");
        assert_eq!(h.jwt.decode(&access, TokenKind::Access).expect("access"), 1);

        let err = h.service.refresh(&access).await.expect_err("access is not refresh");
        assert!(matches!(err, DomainError::InvalidToken));
    }

    #[tokio::test]
    async fn forgot_password_sends_reset_link() {
        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(sample_user(1, "valid_user")));

        h.service
            .forgot_password("VALID_USER@example.com")
            .await
            .expect("must succeed");

        let sent = wait_for_mail(&h.mailer, 1).await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html_body.contains("http://blog.test/password-reset?token="));
    }

    #[tokio::test]
    async fn forgot_password_reports_unknown_email_unless_uniform() {
        let h = harness(AuthPolicy::default());
        let err = h
            .service
            .forgot_password("nobody@example.com")
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::Forbidden));

        let h = harness(AuthPolicy {
            uniform_forgot_response: true,
            ..AuthPolicy::default()
        });
        h.service
            .forgot_password("nobody@example.com")
            .await
            .expect("uniform response");
        assert!(wait_for_mail(&h.mailer, 1).await.is_empty());
    }

    #[tokio::test]
    async fn reset_password_requires_reset_token() {
        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(sample_user(1, "valid_user")));

        let confirm = h.jwt.issue(1, TokenKind::Confirm).expect("token");
        let err = h
            .service
            .reset_password(PasswordResetRequest {
                reset_token: confirm,
                password: "new-secure-password".to_string(),
            })
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidToken));

        let reset = h.jwt.issue(1, TokenKind::Reset).expect("token");
        let user = h
            .service
            .reset_password(PasswordResetRequest {
                reset_token: reset,
                password: "new-secure-password".to_string(),
            })
            .await
            .expect("must reset");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn resolve_session_rechecks_state_only_when_enabled() {
        let inactive = User {
            is_active: false,
            ..sample_user(1, "valid_user")
        };

        let h = harness(AuthPolicy::default());
        h.repo.set_user(Some(inactive.clone()));
        let token = h.jwt.issue(1, TokenKind::Access).expect("token");
        assert!(h.service.resolve_session(&token).await.is_ok());

        let h = harness(AuthPolicy {
            recheck_account_state: true,
            ..AuthPolicy::default()
        });
        h.repo.set_user(Some(inactive));
        let token = h.jwt.issue(1, TokenKind::Access).expect("token");
        let err = h.service.resolve_session(&token).await.expect_err("must fail");
        assert!(matches!(err, DomainError::InactiveAccount));
    }

    #[tokio::test]
    async fn resolve_session_rejects_unknown_user() {
        let h = harness(AuthPolicy::default());
        let token = h.jwt.issue(1, TokenKind::Access).expect("token");
        let err = h.service.resolve_session(&token).await.expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidToken));
    }
}
