//! Login attempt audit trail. One row per password verification.

use chrono::Utc;

use crate::db::connection::DbPool;

pub async fn record_attempt(
    pool: &DbPool,
    member_id: &str,
    success: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO login_logs (member_id, logged_at, success) VALUES (?, ?, ?)")
        .bind(member_id)
        .bind(Utc::now())
        .bind(success)
        .execute(pool)
        .await?;

    Ok(())
}

/// Distinct members with at least one successful login inside the window.
pub async fn recent_success_count(pool: &DbPool, days: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT member_id) FROM login_logs \
         WHERE datetime(logged_at) >= datetime('now', ? || ' days') AND success = 1",
    )
    .bind(format!("-{}", days))
    .fetch_one(pool)
    .await?;

    Ok(count)
}
