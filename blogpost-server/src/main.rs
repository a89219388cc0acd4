use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;
#[cfg(test)]
mod test_support;

use application::auth_service::{AuthPolicy, AuthService};
use application::blog_service::BlogService;
use application::draft_service::DraftService;
use application::notification_service::{MailLinks, NotificationService};
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::draft_repository::PostgresDraftRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::mailer::{LogMailer, Mailer, SmtpMailer};
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let mailer: Arc<dyn Mailer> = match &settings.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "smtp delivery enabled");
            Arc::new(SmtpMailer::new(smtp).context("failed to configure smtp transport")?)
        }
        None => {
            info!("SMTP_HOST is not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let jwt = Arc::new(JwtService::new(&settings.jwt_secret, settings.token_ttls));
    let notifications = Arc::new(NotificationService::new(
        mailer,
        Arc::clone(&jwt),
        MailLinks {
            public_base_url: settings.public_base_url.clone(),
            website_name: settings.website_name.clone(),
        },
    ));

    let policy = AuthPolicy {
        recheck_account_state: settings.auth_recheck_account_state,
        uniform_forgot_response: settings.password_forgot_uniform_response,
    };
    let auth_service = Arc::new(AuthService::new(
        PostgresUserRepository::new(pool.clone()),
        jwt,
        notifications,
        policy,
    ));
    let blog_service = Arc::new(BlogService::new(
        PostgresPostRepository::new(pool.clone()),
        PostgresCommentRepository::new(pool.clone()),
    ));
    let draft_service = Arc::new(DraftService::new(PostgresDraftRepository::new(
        pool.clone(),
    )));

    let state = AppState::new(pool, auth_service, blog_service, draft_service);

    server::run_http(&settings, state).await
}
