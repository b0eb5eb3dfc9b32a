//! Tally batch poster
//!
//! Posts one journal batch read from a JSON file and prints the outcome.
//!
//! Usage:
//!   tally-poster <batch.json>
//!
//! Expired lots are written off first when `posting.expire_before_posting`
//! is set. A batch that loses a serialization race is retried.

mod batch;

use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::{ChartOfAccounts, PostingError, PostingOutcome, PostingProcessor, StoreError};
use tally_db::{PgUnitOfWork, connect};
use tally_shared::{AppConfig, AppError};

use crate::batch::Batch;

/// Attempts per batch before a serialization conflict is reported.
const MAX_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let err = app_error(err);
            error!(error = %err, code = err.error_code(), "Batch not posted");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("Usage: tally-poster <batch.json>")?;

    // Load configuration
    let config = AppConfig::load()
        .map_err(|err| AppError::Configuration(format!("Failed to load configuration: {err}")))?;
    let chart = ChartOfAccounts::build(&config.chart).map_err(AppError::from)?;
    info!(accounts = chart.accounts().count(), "Chart of accounts loaded");

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read batch file {path}"))?;
    let batch: Batch = serde_json::from_str(&raw)
        .map_err(|err| AppError::Validation(format!("Malformed batch {path}: {err}")))?;

    // Connect to database
    let db = connect(&config.database)
        .await
        .map_err(|err| AppError::Database(err.to_string()))?;
    info!("Connected to database");

    let processor = PostingProcessor::new(&chart);
    let system = &config.posting.system_author;

    for attempt in 1..=MAX_ATTEMPTS {
        let now = Local::now().naive_local();
        let mut unit = PgUnitOfWork::begin(&db).await.map_err(posting_error)?;

        let result: Result<PostingOutcome, PostingError> = async {
            if config.posting.expire_before_posting {
                if let Some(expired) = processor.expire_lots(&mut unit, now, system, system).await? {
                    info!(entry_number = ?expired.entry_number, "Expired lots written off");
                }
            }
            processor.post(&mut unit, batch.clone().into_request(now)).await
        }
        .await;

        let committed = match result {
            Ok(outcome) => unit.commit().await.map(|()| outcome).map_err(PostingError::from),
            Err(err) => {
                unit.rollback().await.map_err(posting_error)?;
                Err(err)
            }
        };

        match committed {
            Ok(outcome) => {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            Err(PostingError::Store(StoreError::Conflict)) if attempt < MAX_ATTEMPTS => {
                warn!(attempt, "Serialization conflict, retrying batch");
            }
            Err(err) => return Err(AppError::from(err).into()),
        }
    }

    Err(AppError::from(PostingError::Store(StoreError::Conflict)).into())
}

fn posting_error(err: StoreError) -> AppError {
    AppError::from(PostingError::from(err))
}

/// Anything that is not already an [`AppError`] is internal.
fn app_error(err: anyhow::Error) -> AppError {
    err.downcast::<AppError>()
        .unwrap_or_else(|other| AppError::Internal(format!("{other:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_errors_keep_their_code() {
        let err = app_error(AppError::Validation("bad batch".into()).into());
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = app_error(anyhow::anyhow!("disk full").context("Failed to read batch file"));
        assert!(matches!(&err, AppError::Internal(message) if message.contains("disk full")));
        assert_eq!(err.exit_code(), 70);
    }
}
