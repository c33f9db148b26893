//! Analysis run lifecycle: open, close once, list.

use postpulse_core::{AnalysisRun, PostStore, RunParameters, RunState, SentimentSummary, StoreError};

use crate::error::SentimentError;

/// Run bookkeeping over a [`PostStore`].
#[derive(Clone, Copy)]
pub struct Ledger<'a> {
    store: &'a dyn PostStore,
}

impl<'a> Ledger<'a> {
    #[must_use]
    pub fn new(store: &'a dyn PostStore) -> Self {
        Self { store }
    }

    /// Creates a new run in the `Created` state.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
    /// reached.
    pub async fn open(
        &self,
        subject: &str,
        parameters: &RunParameters,
    ) -> Result<AnalysisRun, SentimentError> {
        let run = self.store.create_run(subject, parameters).await?;
        tracing::info!(
            run_id = run.id,
            public_id = %run.public_id,
            subject,
            requested = parameters.requested(),
            "opened analysis run"
        );
        Ok(run)
    }

    /// Records the summary and scored-post count, moving the run to
    /// `Summarized`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Store`] wrapping
    /// [`StoreError::InvalidRunTransition`] if the run is already summarized,
    /// or [`StoreError::RunNotFound`] if it does not exist.
    pub async fn close(
        &self,
        run: &AnalysisRun,
        summary: &SentimentSummary,
        post_count: u32,
    ) -> Result<AnalysisRun, SentimentError> {
        if run.state() == RunState::Summarized {
            return Err(StoreError::InvalidRunTransition { run_id: run.id }.into());
        }
        let closed = self.store.set_run_summary(run.id, summary, post_count).await?;
        tracing::info!(
            run_id = closed.id,
            post_count,
            positive = summary.positive,
            neutral = summary.neutral,
            negative = summary.negative,
            "closed analysis run"
        );
        Ok(closed)
    }

    /// All runs for `subject`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
    /// reached.
    pub async fn history(&self, subject: &str) -> Result<Vec<AnalysisRun>, SentimentError> {
        Ok(self.store.query_runs(subject).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;

    fn summary() -> SentimentSummary {
        SentimentSummary {
            positive: 0.5,
            neutral: 0.25,
            negative: 0.25,
        }
    }

    #[tokio::test]
    async fn open_then_close_once() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store);
        let params = RunParameters::search(20, 200).unwrap();

        let run = ledger.open("rustlang", &params).await.unwrap();
        assert_eq!(run.state(), RunState::Created);

        let closed = ledger.close(&run, &summary(), 4).await.unwrap();
        assert_eq!(closed.state(), RunState::Summarized);
        assert_eq!(closed.post_count, Some(4));

        let err = ledger.close(&closed, &summary(), 4).await.unwrap_err();
        assert!(matches!(
            err,
            SentimentError::Store(StoreError::InvalidRunTransition { .. })
        ));
    }

    #[tokio::test]
    async fn stale_handle_is_rejected_by_store() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store);
        let run = ledger
            .open("rustlang", &RunParameters::search(5, 200).unwrap())
            .await
            .unwrap();

        ledger.close(&run, &summary(), 2).await.unwrap();
        // `run` still says Created; the store must refuse the second write.
        let err = ledger.close(&run, &summary(), 2).await.unwrap_err();
        assert!(matches!(
            err,
            SentimentError::Store(StoreError::InvalidRunTransition { run_id }) if run_id == run.id
        ));
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store);
        let params = RunParameters::search(5, 200).unwrap();

        let first = ledger.open("rustlang", &params).await.unwrap();
        let second = ledger.open("rustlang", &params).await.unwrap();
        ledger.open("golang", &params).await.unwrap();

        let history = ledger.history("rustlang").await.unwrap();
        let ids: Vec<i64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, [second.id, first.id]);
        assert!(ledger.history("zig").await.unwrap().is_empty());
    }
}
