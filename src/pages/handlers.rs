use axum::{extract::State, response::Html};
use tracing::{instrument, warn};

use crate::{
    auth::{errors::PageError, extractors::CurrentUser, repo::User},
    pages::render,
    state::AppState,
};

/// Guests and signed-in users see the same page, minus the greeting.
#[instrument(skip(state, current))]
pub async fn discussions(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> Result<Html<String>, PageError> {
    let users = User::list_all(&state.db).await?;

    let path = state.config.templates_dir.join(render::DISCUSSIONS_TEMPLATE);
    let template = match tokio::fs::read_to_string(&path).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "discussions template unavailable");
            return Ok(Html(render::DISCUSSIONS_FALLBACK.to_string()));
        }
    };

    Ok(Html(render::discussions(&template, current.as_ref(), &users)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::FromRef,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{app::build_app, auth::jwt::JwtKeys, auth::repo::User, state::AppState};

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().uri(uri);
        if let Some(c) = cookie {
            req = req.header("cookie", c);
        }
        let res = app
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn guest_sees_everyone() {
        let state = AppState::fake().await;
        User::create(&state.db, "alice", "alice@x.com", "h").await.unwrap();
        User::create(&state.db, "bob", "bob@x.com", "h").await.unwrap();
        let app = build_app(state);

        let (status, html) = get(&app, "/discussions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("guest"));
        assert!(html.contains(">alice</li>"));
        assert!(html.contains(">bob</li>"));
    }

    #[tokio::test]
    async fn signed_in_user_is_greeted() {
        let state = AppState::fake().await;
        let alice = User::create(&state.db, "alice", "alice@x.com", "h").await.unwrap();
        let token = JwtKeys::from_ref(&state).issue(alice.id).unwrap();
        let app = build_app(state);

        let cookie = format!("access_token={token}");
        let (status, html) = get(&app, "/discussions", Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Signed in as <strong>alice</strong>"));
    }

    #[tokio::test]
    async fn forged_cookie_is_a_guest() {
        let app = build_app(AppState::fake().await);
        let (status, html) = get(&app, "/discussions", Some("access_token=forged")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("guest"));
    }

    #[tokio::test]
    async fn missing_template_falls_back() {
        let state = AppState::fake_with_templates("/nonexistent/templates").await;
        let app = build_app(state);
        let (status, html) = get(&app, "/discussions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("temporarily unavailable"));
    }

    #[tokio::test]
    async fn landing_page_is_served() {
        let app = build_app(AppState::fake().await);
        let (status, html) = get(&app, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("href=\"/register\""));
    }
}
