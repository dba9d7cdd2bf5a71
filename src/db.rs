use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Settings;
use crate::errors::AppError;

/// Opens the connection pool and makes sure the database answers.
#[tracing::instrument(name = "init_db", skip(settings))]
pub async fn init_db(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .idle_timeout(settings.db_idle_timeout)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database_url)
        .await
        .map_err(|e| {
            AppError::Database(anyhow::Error::from(e).context("Failed to connect to database"))
        })?;

    timeout_query(Duration::from_secs(5), sqlx::query("SELECT 1").execute(&pool)).await?;

    tracing::info!(
        max_connections = settings.db_max_connections,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Runs a query future under a deadline; running out of time is a storage error.
pub async fn timeout_query<T, F>(duration: Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(AppError::from(e)),
        Err(_) => Err(AppError::Database(anyhow::anyhow!(
            "Query timeout after {:?}",
            duration
        ))),
    }
}
