use axum::{
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Form, Router,
};
use tower_http::services::ServeFile;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookies::{clear_session_cookie, session_cookie},
        dto::{normalize_email, LoginForm, RegisterForm},
        errors::PageError,
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo::{StoreError, User},
    },
    config::AppConfig,
    state::AppState,
};

/// The form pages are served from disk; submissions land on the same paths.
pub fn auth_routes(config: &AppConfig) -> Router<AppState> {
    let pages = &config.static_dir;
    Router::new()
        .route(
            "/register",
            get_service(ServeFile::new(pages.join("register.html"))).post(register),
        )
        .route(
            "/login",
            get_service(ServeFile::new(pages.join("login.html"))).post(login),
        )
        .route("/logout", get(logout))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    if form.password != form.password_confirm {
        warn!("register rejected: passwords differ");
        return Err(PageError::PasswordMismatch);
    }

    let email = normalize_email(&form.email);
    let username = form.username.trim();
    let hash = hash_password_blocking(form.password).await?;

    let user = match User::create(&state.db, username, &email, &hash).await {
        Ok(u) => u,
        Err(StoreError::Conflict) => {
            warn!(email = %email, "email already registered");
            return Err(PageError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    start_session(&state, user.id)
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let email = normalize_email(&form.email);

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(PageError::UnknownEmail);
    };

    let matches = verify_password_blocking(form.password, user.hashed_password.clone()).await?;
    if !matches {
        warn!(user_id = user.id, "login invalid password");
        return Err(PageError::WrongPassword);
    }

    info!(user_id = user.id, "user logged in");
    start_session(&state, user.id)
}

/// Tokens are stateless, so logging out only drops the cookie.
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie().to_string())],
        Redirect::to("/"),
    )
        .into_response()
}

fn start_session(state: &AppState, user_id: i64) -> Result<Response, PageError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.issue(user_id)?;
    let cookie = session_cookie(token, state.config.jwt.ttl_seconds());
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to("/discussions"),
    )
        .into_response())
}
