use sqlx::PgPool;
use uuid::Uuid;

/// True when a different user already owns this address.
pub async fn email_taken_by_other(
    db: &PgPool,
    email: &str,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)"#,
    )
    .bind(email)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn update_identity(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"UPDATE users SET name = $2, email = $3 WHERE id = $1"#)
        .bind(user_id)
        .bind(name)
        .bind(email)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_photo(db: &PgPool, user_id: Uuid, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE users SET profile_photo = $2 WHERE id = $1"#)
        .bind(user_id)
        .bind(key)
        .execute(db)
        .await?;
    Ok(())
}
