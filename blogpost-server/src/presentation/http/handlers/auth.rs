use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::user::{LoginRequest, PasswordResetRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;

const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 1, max = 250))]
    pub(crate) full_name: String,
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

impl RegisterDto {
    /// Identity fields are checked trimmed, the password as typed.
    fn into_request(self) -> AppResult<RegisterRequest> {
        let dto = Self {
            full_name: self.full_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        };
        dto.validate()?;

        Ok(RegisterRequest {
            full_name: dto.full_name,
            username: dto.username,
            email: dto.email,
            password: dto.password,
        })
    }
}

/// OAuth2 password form: `username` + `password`, urlencoded.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginForm {
    #[validate(length(min = 1, max = 64))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RefreshTokenDto {
    pub(crate) refresh_token: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ForgotPasswordQuery {
    /// Email of the account
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PasswordResetDto {
    pub(crate) reset_token: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LoginResponseDto {
    pub(crate) token_type: String,
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct RefreshTokenResponseDto {
    pub(crate) token_type: String,
    pub(crate) access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageDto {
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PasswordResetResponseDto {
    pub(crate) message: String,
    pub(crate) user: UserDto,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

fn message(text: &str) -> Json<MessageDto> {
    Json(MessageDto {
        message: text.to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered, confirmation email scheduled", body = UserDto),
        (status = 400, description = "Validation error or user already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(dto): Json<RegisterDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.auth_service.register(dto.into_request()?).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Inactive or unconfirmed account"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<(StatusCode, Json<LoginResponseDto>)> {
    form.validate()?;

    let req = LoginRequest {
        username: form.username,
        password: form.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((
        StatusCode::OK,
        Json(LoginResponseDto {
            token_type: TOKEN_TYPE.to_string(),
            access_token: result.access_token,
            refresh_token: result.refresh_token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/confirm/{token}",
    tag = "auth",
    params(
        ("token" = String, Path, description = "Confirmation token from the email")
    ),
    responses(
        (status = 200, description = "Email confirmed", body = MessageDto),
        (status = 401, description = "Invalid or expired token"),
        (status = 403, description = "User is missing or inactive"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<(StatusCode, Json<MessageDto>)> {
    state.auth_service.confirm_email(&token).await?;
    Ok((StatusCode::OK, message("Success")))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "auth",
    request_body = RefreshTokenDto,
    responses(
        (status = 200, description = "New access token", body = RefreshTokenResponseDto),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn refresh_token(
    State(state): State<AppState>,
    Json(dto): Json<RefreshTokenDto>,
) -> AppResult<(StatusCode, Json<RefreshTokenResponseDto>)> {
    let access_token = state.auth_service.refresh(&dto.refresh_token).await?;

    Ok((
        StatusCode::OK,
        Json(RefreshTokenResponseDto {
            token_type: TOKEN_TYPE.to_string(),
            access_token,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/password-forgot-email",
    tag = "auth",
    params(ForgotPasswordQuery),
    responses(
        (status = 200, description = "Reset email scheduled", body = MessageDto),
        (status = 400, description = "Invalid email"),
        (status = 403, description = "Unknown or inactive account"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn password_forgot_email(
    State(state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> AppResult<(StatusCode, Json<MessageDto>)> {
    state.auth_service.forgot_password(&query.email).await?;
    Ok((StatusCode::OK, message("Email to reset password sent")))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    tag = "auth",
    request_body = PasswordResetDto,
    responses(
        (status = 200, description = "Password replaced", body = PasswordResetResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid or expired token"),
        (status = 403, description = "User is missing or inactive"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn password_reset(
    State(state): State<AppState>,
    Json(dto): Json<PasswordResetDto>,
) -> AppResult<(StatusCode, Json<PasswordResetResponseDto>)> {
    dto.validate()?;

    let req = PasswordResetRequest {
        reset_token: dto.reset_token,
        password: dto.password,
    };
    let user = state.auth_service.reset_password(req).await?;

    Ok((
        StatusCode::OK,
        Json(PasswordResetResponseDto {
            message: "Password reset done".to_string(),
            user: user.into(),
        }),
    ))
}
