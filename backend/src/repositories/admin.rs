//! Data access for administrator accounts.

use chrono::Utc;

use crate::db::connection::DbPool;
use crate::models::admin::Admin;

pub async fn find_by_username(
    pool: &DbPool,
    username: &str,
) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>(
        "SELECT id, username, password_hash, created_at FROM admins WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Seeds an admin account unless the username is already taken. Returns
/// `true` when the row was created.
pub async fn ensure_admin(
    pool: &DbPool,
    username: &str,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO admins (username, password_hash, created_at) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
