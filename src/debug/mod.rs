//! Unauthenticated user listings. Only mounted when `DEBUG_ROUTES` is on.

use axum::{extract::State, response::Html, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::{errors::PageError, repo::User},
    pages::render,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debug/users", get(list_users))
        .route("/debug/users/html", get(list_users_html))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, PageError> {
    Ok(Json(User::list_all(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn list_users_html(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let users = User::list_all(&state.db).await?;
    Ok(Html(render::users_table(&users)))
}
