use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload carried in the session cookie.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The subject as a user id, if it is one.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Outcome of parsing a token. Anything but `Valid` means "no session".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Valid(Claims),
    Invalid,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: TimeDuration::seconds(cfg.ttl_seconds()),
        }
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub fn issue_with_ttl(&self, user_id: i64, ttl: TimeDuration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry. Never fails: bad tokens are `Invalid`.
    pub fn parse(&self, token: &str) -> TokenState {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => TokenState::Valid(data.claims),
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                TokenState::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_minutes: 60 * 24 * 7,
        })
    }

    #[test]
    fn issue_and_parse_token() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(42).expect("sign");
        match keys.parse(&token) {
            TokenState::Valid(claims) => {
                assert_eq!(claims.sub, "42");
                assert_eq!(claims.user_id(), Some(42));
                assert_eq!(claims.exp - claims.iat, 604_800);
            }
            TokenState::Invalid => panic!("fresh token should be valid"),
        }
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = make_keys("dev-secret");
        let token = keys
            .issue_with_ttl(7, TimeDuration::seconds(-30))
            .expect("sign");
        assert_eq!(keys.parse(&token), TokenState::Invalid);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = make_keys("one").issue(1).expect("sign");
        assert_eq!(make_keys("two").parse(&token), TokenState::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = make_keys("dev-secret");
        assert_eq!(keys.parse(""), TokenState::Invalid);
        assert_eq!(keys.parse("not.a.jwt"), TokenState::Invalid);
    }

    #[test]
    fn non_numeric_subject_has_no_user_id() {
        let claims = Claims {
            sub: "abc".into(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
