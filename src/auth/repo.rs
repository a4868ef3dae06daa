use sqlx::SqlitePool;
use time::OffsetDateTime;

pub use crate::auth::repo_types::{StoreError, User};

impl User {
    /// Insert a new user. A duplicate email (case-insensitive) is a `Conflict`
    /// and leaves the table untouched.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, hashed_password, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, email, hashed_password, created_at
            "#,
        )
        .bind(username)
        .bind(email.to_lowercase())
        .bind(hashed_password)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict
            }
            other => StoreError::Database(other),
        })?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Every user, oldest id first.
    pub async fn list_all(db: &SqlitePool) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, created_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
