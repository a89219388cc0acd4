use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) full_name: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let full_name = normalize_full_name(&self.full_name)?;
        let username = normalize_register_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Self {
            full_name,
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..64 chars",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PasswordResetRequest {
    pub(crate) reset_token: String,
    pub(crate) password: String,
}

impl PasswordResetRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let reset_token = self.reset_token.trim();
        if reset_token.is_empty() {
            return Err(DomainError::InvalidToken);
        }
        validate_password(&self.password)?;
        Ok(Self {
            reset_token: reset_token.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) full_name: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) is_active: bool,
    pub(crate) is_confirmed: bool,
    pub(crate) last_login: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    /// Login gate: inactive accounts are rejected before unconfirmed ones.
    pub(crate) fn ensure_can_login(&self) -> Result<(), DomainError> {
        if !self.is_active {
            return Err(DomainError::InactiveAccount);
        }
        if !self.is_confirmed {
            return Err(DomainError::UnconfirmedAccount);
        }
        Ok(())
    }
}

/// Public part of a user shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthorSummary {
    pub(crate) full_name: String,
    pub(crate) username: String,
}

pub(crate) fn validate_password(password: &str) -> Result<(), DomainError> {
    let password_len = password.chars().count();
    if !(8..=128).contains(&password_len) {
        return Err(DomainError::Validation {
            field: "password",
            message: "must be 8..128 chars",
        });
    }
    Ok(())
}

fn normalize_full_name(full_name: &str) -> Result<String, DomainError> {
    let full_name = full_name.trim();
    if full_name.is_empty() || full_name.chars().count() > 250 {
        return Err(DomainError::Validation {
            field: "full_name",
            message: "must be 1..250 chars",
        });
    }
    Ok(full_name.to_string())
}

fn normalize_register_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 64 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..64 chars",
        });
    }
    Ok(username.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{
        PasswordResetRequest, RegisterRequest, User, normalize_email, normalize_register_username,
    };
    use crate::domain::error::DomainError;
    use chrono::Utc;

    fn user(is_active: bool, is_confirmed: bool) -> User {
        User {
            id: 1,
            full_name: "Jane Doe".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            is_active,
            is_confirmed,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn register_username_rules_are_applied() {
        assert!(normalize_register_username("ab").is_err());
        assert!(normalize_register_username("valid_user").is_ok());
    }

    #[test]
    fn register_request_requires_full_name() {
        let req = RegisterRequest {
            full_name: "   ".to_string(),
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        match req.validate().expect_err("blank full_name must fail") {
            DomainError::Validation { field, .. } => assert_eq!(field, "full_name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            full_name: "Valid User".to_string(),
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            full_name: "  Valid User ".to_string(),
            username: "valid_user".to_string(),
            email: "TEST@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.full_name, "Valid User");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn password_reset_request_rejects_blank_token() {
        let req = PasswordResetRequest {
            reset_token: "  ".to_string(),
            password: "very-secure-password".to_string(),
        };
        assert!(matches!(req.validate(), Err(DomainError::InvalidToken)));
    }

    #[test]
    fn login_gate_checks_active_before_confirmed() {
        assert!(matches!(
            user(false, false).ensure_can_login(),
            Err(DomainError::InactiveAccount)
        ));
        assert!(matches!(
            user(true, false).ensure_can_login(),
            Err(DomainError::UnconfirmedAccount)
        ));
        assert!(user(true, true).ensure_can_login().is_ok());
    }
}
