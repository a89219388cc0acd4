use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttls: TokenTtls,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub public_base_url: String,
    pub website_name: String,
    pub smtp: Option<SmtpSettings>,
    pub auth_recheck_account_state: bool,
    pub password_forgot_uniform_response: bool,
}

/// Lifetimes of the four token kinds, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub access_minutes: i64,
    pub refresh_minutes: i64,
    pub confirm_minutes: i64,
    pub reset_minutes: i64,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access_minutes: 30,
            refresh_minutes: 24 * 60,
            confirm_minutes: 24 * 60,
            reset_minutes: 24 * 60,
        }
    }
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from", &self.from)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 10)?;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let defaults = TokenTtls::default();
        let token_ttls = TokenTtls {
            access_minutes: parse_minutes_env("JWT_ACCESS_TTL_MINUTES", defaults.access_minutes)?,
            refresh_minutes: parse_minutes_env(
                "JWT_REFRESH_TTL_MINUTES",
                defaults.refresh_minutes,
            )?,
            confirm_minutes: parse_minutes_env(
                "JWT_CONFIRM_TTL_MINUTES",
                defaults.confirm_minutes,
            )?,
            reset_minutes: parse_minutes_env("JWT_RESET_TTL_MINUTES", defaults.reset_minutes)?,
        };

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 10)?;

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let website_name =
            std::env::var("WEBSITE_NAME").unwrap_or_else(|_| "Blogpost".to_string());
        let smtp = smtp_from_env()?;

        let auth_recheck_account_state = parse_bool_env("AUTH_RECHECK_ACCOUNT_STATE", false)?;
        let password_forgot_uniform_response =
            parse_bool_env("PASSWORD_FORGOT_UNIFORM_RESPONSE", false)?;

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            token_ttls,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            public_base_url,
            website_name,
            smtp,
            auth_recheck_account_state,
            password_forgot_uniform_response,
        })
    }
}

/// SMTP delivery is enabled only when `SMTP_HOST` is set.
fn smtp_from_env() -> Result<Option<SmtpSettings>> {
    let host = match std::env::var("SMTP_HOST") {
        Ok(host) if !host.trim().is_empty() => host.trim().to_string(),
        _ => return Ok(None),
    };
    let port = std::env::var("SMTP_PORT")
        .unwrap_or_else(|_| "587".to_string())
        .parse::<u16>()
        .context("Failed to parse SMTP_PORT, expecting port number")?;
    let username = get_required("SMTP_USERNAME").context("SMTP_USERNAME is required with SMTP_HOST")?;
    let password = get_required("SMTP_PASSWORD").context("SMTP_PASSWORD is required with SMTP_HOST")?;
    let from = std::env::var("MAIL_FROM").unwrap_or_else(|_| username.clone());

    Ok(Some(SmtpSettings {
        host,
        port,
        username,
        password,
        from,
    }))
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_u32(key, &raw)
}

fn parse_u32(key: &str, raw: &str) -> Result<u32> {
    let value = raw
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

/// Ten years; longer lifetimes push `exp` past what chrono can represent.
pub(crate) const MAX_TTL_MINUTES: i64 = 10 * 365 * 24 * 60;

fn parse_minutes_env(key: &str, default: i64) -> Result<i64> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_minutes(key, &raw)
}

fn parse_minutes(key: &str, raw: &str) -> Result<i64> {
    let value = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Failed to parse {key}, expecting integer minutes"))?;

    if value <= 0 || value > MAX_TTL_MINUTES {
        return Err(anyhow!("{key} must be in 1..={MAX_TTL_MINUTES}"));
    }
    Ok(value)
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw).ok_or_else(|| anyhow!("{key} must be true or false")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
