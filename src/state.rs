use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;

        Ok(Self::from_parts(db, config))
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// In-memory database with the schema applied; debug routes enabled.
    #[cfg(test)]
    pub async fn fake() -> Self {
        let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));

        // A single connection that never expires keeps the in-memory database alive.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool ok");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: 60 * 24 * 7,
            },
            static_dir: manifest.join("static"),
            templates_dir: manifest.join("templates"),
            debug_routes: true,
            listen_addr: ([127, 0, 0, 1], 0).into(),
        });

        let state = Self::from_parts(db, config);
        state.migrate().await.expect("migrations apply");
        state
    }

    /// Same as [`AppState::fake`] but with a different templates directory.
    #[cfg(test)]
    pub async fn fake_with_templates(dir: &str) -> Self {
        let state = Self::fake().await;
        let mut config = (*state.config).clone();
        config.templates_dir = dir.into();
        Self::from_parts(state.db, Arc::new(config))
    }
}
