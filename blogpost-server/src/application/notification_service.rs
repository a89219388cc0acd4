use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::user::User;
use crate::infrastructure::jwt::{JwtService, TokenKind};
use crate::infrastructure::mailer::{Mailer, OutgoingEmail};

#[derive(Debug, Clone)]
pub(crate) struct MailLinks {
    pub(crate) public_base_url: String,
    pub(crate) website_name: String,
}

impl MailLinks {
    fn confirmation_url(&self, token: &str) -> String {
        format!("{}/api/auth/confirm/{token}", self.public_base_url)
    }

    fn password_reset_url(&self, token: &str) -> String {
        format!("{}/password-reset?token={token}", self.public_base_url)
    }
}

/// Письма отправляются в фоне: вызывающий не ждёт доставки,
/// ошибки только логируются.
pub(crate) struct NotificationService {
    mailer: Arc<dyn Mailer>,
    jwt: Arc<JwtService>,
    links: MailLinks,
}

impl NotificationService {
    pub(crate) fn new(mailer: Arc<dyn Mailer>, jwt: Arc<JwtService>, links: MailLinks) -> Self {
        Self { mailer, jwt, links }
    }

    pub(crate) fn send_confirmation(&self, user: &User) -> Option<JoinHandle<()>> {
        let token = match self.jwt.issue(user.id, TokenKind::Confirm) {
            Ok(token) => token,
            Err(err) => {
                warn!(user_id = user.id, error = %err, "failed to issue confirmation token");
                return None;
            }
        };
        let url = self.links.confirmation_url(&token);
        let html_body = format!(
            "<p>Hi {name},</p>\
             <p>Thanks for signing up at {site}. Please confirm your email address:</p>\
             <p><a href=\"{url}\">Confirm email</a></p>",
            name = escape_html(&user.full_name),
            site = escape_html(&self.links.website_name),
        );

        Some(self.dispatch(OutgoingEmail {
            to_name: user.full_name.clone(),
            to_email: user.email.clone(),
            subject: format!("{} - confirm your email", self.links.website_name),
            html_body,
        }))
    }

    pub(crate) fn send_password_reset(&self, user: &User) -> Option<JoinHandle<()>> {
        let token = match self.jwt.issue(user.id, TokenKind::Reset) {
            Ok(token) => token,
            Err(err) => {
                warn!(user_id = user.id, error = %err, "failed to issue reset token");
                return None;
            }
        };
        let url = self.links.password_reset_url(&token);
        let html_body = format!(
            "<p>Hi {name},</p>\
             <p>A password reset was requested for your {site} account.</p>\
             <p><a href=\"{url}\">Reset password</a></p>\
             <p>If it was not you, ignore this email.</p>",
            name = escape_html(&user.full_name),
            site = escape_html(&self.links.website_name),
        );

        Some(self.dispatch(OutgoingEmail {
            to_name: user.full_name.clone(),
            to_email: user.email.clone(),
            subject: format!("{} - password reset", self.links.website_name),
            html_body,
        }))
    }

    fn dispatch(&self, email: OutgoingEmail) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let to = email.to_email.clone();
            let subject = email.subject.clone();
            match mailer.send(email).await {
                Ok(()) => info!(to = %to, subject = %subject, "email sent"),
                Err(err) => warn!(to = %to, subject = %subject, error = %err, "email delivery failed"),
            }
        })
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
