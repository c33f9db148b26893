//! [`PostStore`] backed by Postgres.

use std::collections::HashSet;

use async_trait::async_trait;
use postpulse_core::{
    AnalysisRun, NewPost, PostFilter, PostStore, RunParameters, SentimentSummary, StoreError,
    StoredPost,
};
use sqlx::PgPool;

use crate::{analysis_runs, posts, DbError};

/// Postgres implementation of the store interface used by the ingest pipeline.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: DbError) -> StoreError {
    match err {
        DbError::Corrupt(reason) => StoreError::Corrupt(reason),
        other => StoreError::Unavailable(other.to_string()),
    }
}

fn run_error(run_id: i64, err: DbError) -> StoreError {
    match err {
        DbError::NotFound => StoreError::RunNotFound(run_id),
        DbError::InvalidRunTransition { id } => StoreError::InvalidRunTransition { run_id: id },
        other => store_error(other),
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_if_absent(&self, post: NewPost) -> Result<StoredPost, StoreError> {
        let row = posts::insert_post_if_absent(&self.pool, &post)
            .await
            .map_err(|e| match e {
                DbError::NotFound => StoreError::Conflict {
                    external_id: post.external_id.clone(),
                },
                other => store_error(other),
            })?;
        StoredPost::try_from(row).map_err(store_error)
    }

    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        posts::post_exists(&self.pool, external_id)
            .await
            .map_err(store_error)
    }

    async fn existing_ids(&self, external_ids: &[String]) -> Result<HashSet<String>, StoreError> {
        let found = posts::existing_external_ids(&self.pool, external_ids)
            .await
            .map_err(store_error)?;
        Ok(found.into_iter().collect())
    }

    async fn create_run(
        &self,
        subject: &str,
        parameters: &RunParameters,
    ) -> Result<AnalysisRun, StoreError> {
        let row = analysis_runs::create_analysis_run(&self.pool, subject, parameters)
            .await
            .map_err(store_error)?;
        AnalysisRun::try_from(row).map_err(store_error)
    }

    async fn set_run_summary(
        &self,
        run_id: i64,
        summary: &SentimentSummary,
        post_count: u32,
    ) -> Result<AnalysisRun, StoreError> {
        let row = analysis_runs::set_analysis_run_summary(&self.pool, run_id, summary, post_count)
            .await
            .map_err(|e| run_error(run_id, e))?;
        AnalysisRun::try_from(row).map_err(store_error)
    }

    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<StoredPost>, StoreError> {
        let rows = posts::list_posts(&self.pool, filter)
            .await
            .map_err(store_error)?;
        rows.into_iter()
            .map(|row| StoredPost::try_from(row).map_err(store_error))
            .collect()
    }

    async fn query_runs(&self, subject: &str) -> Result<Vec<AnalysisRun>, StoreError> {
        let rows = analysis_runs::list_analysis_runs_by_subject(&self.pool, subject)
            .await
            .map_err(store_error)?;
        rows.into_iter()
            .map(|row| AnalysisRun::try_from(row).map_err(store_error))
            .collect()
    }
}
