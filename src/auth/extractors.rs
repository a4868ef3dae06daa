use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use cookie::Cookie;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{
    cookies::SESSION_COOKIE,
    jwt::{JwtKeys, TokenState},
    repo::User,
};
use crate::state::AppState;

/// The user behind the session cookie, or `None` for a guest.
/// Never rejects: every failure resolves to a guest.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers);
        let keys = JwtKeys::from_ref(state);
        Ok(CurrentUser(resolve_session(&state.db, &keys, token.as_deref()).await))
    }
}

/// Value of the session cookie across all `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

pub async fn resolve_session(
    db: &SqlitePool,
    keys: &JwtKeys,
    token: Option<&str>,
) -> Option<User> {
    let token = token.filter(|t| !t.is_empty())?;

    let claims = match keys.parse(token) {
        TokenState::Valid(claims) => claims,
        TokenState::Invalid => return None,
    };

    let Some(user_id) = claims.user_id() else {
        debug!(sub = %claims.sub, "token subject is not a user id");
        return None;
    };

    match User::find_by_id(db, user_id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            debug!(user_id, "token refers to a missing user");
            None
        }
        Err(e) => {
            warn!(error = %e, user_id, "session lookup failed");
            None
        }
    }
}
