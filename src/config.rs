use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Longest accepted token lifetime: ten years.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;
const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 7;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Lifetime of an issued token, also used as the cookie max-age.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_minutes * 60
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub debug_routes: bool,
    pub listen_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://database.db".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())
                .context("invalid JWT_TTL_MINUTES")?,
        };
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
        let templates_dir = std::env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".into());
        let debug_routes = std::env::var("DEBUG_ROUTES")
            .map(|v| matches!(v.as_str(), "1" | "true"))
            .unwrap_or(false);
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into());
        let listen_addr = format!("{host}:{port}")
            .parse()
            .context("invalid APP_HOST/APP_PORT")?;
        Ok(Self {
            database_url,
            jwt,
            static_dir: static_dir.into(),
            templates_dir: templates_dir.into(),
            debug_routes,
            listen_addr,
        })
    }
}

/// Unset means one week. Anything set must be a whole number of minutes
/// between 1 and ten years.
fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{raw:?} is not a number of minutes"))?;
    anyhow::ensure!(
        (1..=MAX_TTL_MINUTES).contains(&minutes),
        "{minutes} is outside 1..={MAX_TTL_MINUTES}"
    );
    Ok(minutes)
}
