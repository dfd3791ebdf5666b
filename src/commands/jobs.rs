//! Jobs command - the email worker and its queue.
//!
//! ```bash
//! # Deliver queued password reset emails
//! robot-cleaner-api jobs work
//!
//! # Queue counts by status
//! robot-cleaner-api jobs list
//!
//! # Drop failed jobs
//! robot-cleaner-api jobs clear
//! ```

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Run the email worker until ctrl-c
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;

    use crate::jobs::{connect_storage, email_job_handler};

    tracing::info!("Connecting to database for job worker...");
    let email_storage = connect_storage(&config.database_url).await?;

    tracing::info!("Email worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new("email-worker")
        .backend(email_storage)
        .build_fn(email_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped.");
    Ok(())
}

/// apalis namespaces jobs by the payload's type name
fn email_job_type() -> &'static str {
    std::any::type_name::<EmailJob>()
}

async fn queue_connection(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    let db = sea_orm::Database::connect(&config.database_url).await?;

    let initialized = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT to_regclass('apalis.jobs') IS NOT NULL AS ready".to_string(),
        ))
        .await?
        .and_then(|row| row.try_get::<bool>("", "ready").ok())
        .unwrap_or(false);

    Ok(initialized.then_some(db))
}

/// Print email job counts by status
async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Email queue not initialized. Start `serve` or `jobs work` once to create it.");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT status::text AS status, COUNT(*)::bigint AS count \
             FROM apalis.jobs WHERE job_type = $1 GROUP BY status ORDER BY status",
            [email_job_type().into()],
        ))
        .await?;

    println!("Email jobs:");
    if rows.is_empty() {
        println!("  (none)");
    }
    for row in rows {
        let status: String = row.try_get("", "status")?;
        let count: i64 = row.try_get("", "count")?;
        println!("  {:<10} {}", status, count);
    }

    Ok(())
}

/// Delete failed email jobs
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Email queue not initialized. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed' AND job_type = $1",
            [email_job_type().into()],
        ))
        .await?;

    tracing::info!(count = result.rows_affected(), "Cleared failed email jobs");
    println!("Cleared {} failed email job(s).", result.rows_affected());

    Ok(())
}
