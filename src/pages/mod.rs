use axum::{
    routing::{get, get_service},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{config::AppConfig, state::AppState};

pub mod handlers;
pub mod render;

pub fn router(config: &AppConfig) -> Router<AppState> {
    let pages = &config.static_dir;
    Router::new()
        .route("/", get_service(ServeFile::new(pages.join("index.html"))))
        .route("/discussions", get(handlers::discussions))
        .nest_service("/static", ServeDir::new(pages))
}
