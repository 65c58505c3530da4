use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub type DbPool = SqlitePool;

/// Opens the SQLite pool. Foreign keys are enforced per connection and the
/// busy timeout covers concurrent writers sharing one database file.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(20));

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}
