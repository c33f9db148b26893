//! Database operations for the `analysis_runs` table.

use chrono::{DateTime, Utc};
use postpulse_core::{AnalysisRun, RunParameters, SentimentSummary};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `analysis_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub subject: String,
    pub query_parameters: Value,
    pub positive_ratio: Option<Decimal>,
    pub neutral_ratio: Option<Decimal>,
    pub negative_ratio: Option<Decimal>,
    pub post_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRunRow> for AnalysisRun {
    type Error = DbError;

    fn try_from(row: AnalysisRunRow) -> Result<Self, Self::Error> {
        let parameters: RunParameters = serde_json::from_value(row.query_parameters)
            .map_err(|e| DbError::Corrupt(format!("run {} parameters: {e}", row.id)))?;

        let summary = match (row.positive_ratio, row.neutral_ratio, row.negative_ratio) {
            (Some(p), Some(n), Some(g)) => Some(SentimentSummary {
                positive: p.to_f64().unwrap_or(0.0),
                neutral: n.to_f64().unwrap_or(0.0),
                negative: g.to_f64().unwrap_or(0.0),
            }),
            (None, None, None) => None,
            _ => {
                return Err(DbError::Corrupt(format!(
                    "run {} has a partially written summary",
                    row.id
                )))
            }
        };

        let post_count = row
            .post_count
            .map(u32::try_from)
            .transpose()
            .map_err(|_| DbError::Corrupt(format!("run {} has a negative post count", row.id)))?;

        Ok(AnalysisRun {
            id: row.id,
            public_id: row.public_id,
            subject: row.subject,
            parameters,
            created_at: row.created_at,
            summary,
            post_count,
        })
    }
}

const RUN_COLUMNS: &str = "id, public_id, subject, query_parameters, positive_ratio, \
                           neutral_ratio, negative_ratio, post_count, created_at";

fn ratio(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(2)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Creates a new, unsummarized analysis run.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::Corrupt`] if
/// `parameters` cannot be encoded.
pub async fn create_analysis_run(
    pool: &PgPool,
    subject: &str,
    parameters: &RunParameters,
) -> Result<AnalysisRunRow, DbError> {
    let public_id = Uuid::new_v4();
    let parameters = serde_json::to_value(parameters)
        .map_err(|e| DbError::Corrupt(format!("run parameters: {e}")))?;

    let row = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "INSERT INTO analysis_runs (public_id, subject, query_parameters) \
         VALUES ($1, $2, $3) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(subject)
    .bind(parameters)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Writes the summary and scored-post count onto a run.
///
/// The update only applies while the summary columns are still `NULL`, so a
/// run is summarized at most once.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has `id`,
/// [`DbError::InvalidRunTransition`] if the run is already summarized, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn set_analysis_run_summary(
    pool: &PgPool,
    id: i64,
    summary: &SentimentSummary,
    post_count: u32,
) -> Result<AnalysisRunRow, DbError> {
    let post_count = i32::try_from(post_count).unwrap_or(i32::MAX);

    let row = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "UPDATE analysis_runs \
         SET positive_ratio = $1, neutral_ratio = $2, negative_ratio = $3, post_count = $4 \
         WHERE id = $5 AND post_count IS NULL \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(ratio(summary.positive))
    .bind(ratio(summary.neutral))
    .bind(ratio(summary.negative))
    .bind(post_count)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(row),
        None => {
            // Distinguish an unknown id from a second summary attempt.
            get_analysis_run(pool, id).await?;
            Err(DbError::InvalidRunTransition { id })
        }
    }
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_analysis_run(pool: &PgPool, id: i64) -> Result<AnalysisRunRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM analysis_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns every run for `subject`, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analysis_runs_by_subject(
    pool: &PgPool,
    subject: &str,
) -> Result<Vec<AnalysisRunRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "SELECT {RUN_COLUMNS} \
         FROM analysis_runs \
         WHERE subject = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(subject)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
