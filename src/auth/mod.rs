use crate::{config::AppConfig, state::AppState};
use axum::Router;

pub mod cookies;
mod dto;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
mod repo_types;

pub fn router(config: &AppConfig) -> Router<AppState> {
    Router::new().merge(handlers::auth_routes(config))
}
