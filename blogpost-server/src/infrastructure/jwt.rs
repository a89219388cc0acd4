use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::TokenTtls;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("token kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("token subject is not a user id")]
    InvalidSubject,

    #[error("token lifetime is out of range")]
    TtlOutOfRange,
}

/// Purpose tag carried in every token; a token is only honoured for its own kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenKind {
    Access,
    Refresh,
    Confirm,
    Reset,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
    pub(crate) iat: i64,
    pub(crate) kind: TokenKind,
}

pub(crate) struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttls: TokenTtls,
}

impl JwtService {
    pub(crate) fn new(secret: &str, ttls: TokenTtls) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttls,
        }
    }

    pub(crate) fn ttl_for(&self, kind: TokenKind) -> Result<Duration, JwtError> {
        let minutes = match kind {
            TokenKind::Access => self.ttls.access_minutes,
            TokenKind::Refresh => self.ttls.refresh_minutes,
            TokenKind::Confirm => self.ttls.confirm_minutes,
            TokenKind::Reset => self.ttls.reset_minutes,
        };
        Duration::try_minutes(minutes).ok_or(JwtError::TtlOutOfRange)
    }

    pub(crate) fn issue(&self, user_id: i64, kind: TokenKind) -> Result<String, JwtError> {
        self.issue_with_ttl(user_id, kind, self.ttl_for(kind)?)
    }

    pub(crate) fn issue_with_ttl(
        &self,
        user_id: i64,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or(JwtError::TtlOutOfRange)?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encode)
    }

    pub(crate) fn decode(&self, token: &str, expected: TokenKind) -> Result<i64, JwtError> {
        self.decode_at(token, expected, Utc::now().timestamp())
    }

    /// Expiry is strict: a token is dead once `exp <= now`.
    fn decode_at(&self, token: &str, expected: TokenKind, now: i64) -> Result<i64, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decode)?
            .claims;

        if claims.exp <= now {
            return Err(JwtError::Expired);
        }
        if claims.kind != expected {
            return Err(JwtError::KindMismatch {
                expected,
                actual: claims.kind,
            });
        }

        claims
            .sub
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(JwtError::InvalidSubject)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{JwtError, JwtService, TokenKind};
    use crate::infrastructure::settings::TokenTtls;

    fn service() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", TokenTtls::default())
    }

    #[test]
    fn issued_token_decodes_to_same_user() {
        let jwt = service();
        for user_id in [1, 42, i64::MAX] {
            let token = jwt.issue(user_id, TokenKind::Access).expect("must encode");
            let decoded = jwt.decode(&token, TokenKind::Access).expect("must decode");
            assert_eq!(decoded, user_id);
        }
    }

    #[test]
    fn access_token_is_rejected_as_confirm_token() {
        let jwt = service();
        let token = jwt.issue(7, TokenKind::Access).expect("must encode");

        let err = jwt
            .decode(&token, TokenKind::Confirm)
            .expect_err("kind must be checked");
        assert!(matches!(
            err,
            JwtError::KindMismatch {
                expected: TokenKind::Confirm,
                actual: TokenKind::Access
            }
        ));
    }

    #[test]
    fn confirm_token_is_rejected_as_access_token() {
        let jwt = service();
        let token = jwt.issue(7, TokenKind::Confirm).expect("must encode");
        assert!(jwt.decode(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn zero_ttl_token_is_expired_immediately() {
        let jwt = service();
        let token = jwt
            .issue_with_ttl(7, TokenKind::Access, Duration::zero())
            .expect("must encode");

        let err = jwt
            .decode(&token, TokenKind::Access)
            .expect_err("zero ttl must be expired");
        assert!(matches!(err, JwtError::Expired));
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let jwt = service();
        let token = jwt
            .issue_with_ttl(7, TokenKind::Reset, Duration::seconds(60))
            .expect("must encode");
        let exp = Utc::now().timestamp() + 60;

        assert!(jwt.decode_at(&token, TokenKind::Reset, exp - 5).is_ok());
        assert!(matches!(
            jwt.decode_at(&token, TokenKind::Reset, exp + 1),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new("ffffffffffffffffffffffffffffffff", TokenTtls::default());
        let token = other.issue(7, TokenKind::Access).expect("must encode");

        let err = service()
            .decode(&token, TokenKind::Access)
            .expect_err("signature must be checked");
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn ttl_for_uses_configured_minutes() {
        let jwt = service();
        assert_eq!(
            jwt.ttl_for(TokenKind::Access).expect("in range"),
            Duration::minutes(30)
        );
        assert_eq!(
            jwt.ttl_for(TokenKind::Refresh).expect("in range"),
            Duration::minutes(1440)
        );
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let jwt = JwtService::new(
            "0123456789abcdef0123456789abcdef",
            TokenTtls {
                refresh_minutes: 200_000_000_000,
                ..TokenTtls::default()
            },
        );

        let err = jwt
            .issue(1, TokenKind::Refresh)
            .expect_err("lifetime must be rejected");
        assert!(matches!(err, JwtError::TtlOutOfRange));
        assert!(jwt.issue(1, TokenKind::Access).is_ok());
    }
}
