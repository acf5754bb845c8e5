use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_photo: Option<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, profile_photo, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, profile_photo, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, profile_photo, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

/// Server-side session row. Carries the display fields the navigation bar
/// needs on every page so authenticated requests cost one lookup.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub async fn create(
        db: &PgPool,
        token: &str,
        user: &User,
        expires_at: OffsetDateTime,
    ) -> Result<Session, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, user_name, user_email, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token, user_id, user_name, user_email, created_at, expires_at
            "#,
        )
        .bind(token)
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(expires_at)
        .fetch_one(db)
        .await
    }

    /// Look up a session that has not expired. Expired rows simply stop
    /// matching; no separate sweep is needed for correctness.
    pub async fn find_live(db: &PgPool, token: &str) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, user_name, user_email, created_at, expires_at
            FROM sessions
            WHERE token = $1 AND expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM sessions WHERE token = $1"#)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Keep cached display fields in step with the user record after a
    /// profile update.
    pub async fn refresh_display(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET user_name = $2, user_email = $3
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .execute(db)
        .await?;
        Ok(())
    }
}
