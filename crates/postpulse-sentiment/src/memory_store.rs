//! In-process [`PostStore`] used for dry runs and tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use postpulse_core::{
    AnalysisRun, NewPost, PostFilter, PostOrder, PostStore, RunParameters, SentimentSummary,
    StoreError, StoredPost,
};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    runs: Vec<AnalysisRun>,
    posts: Vec<StoredPost>,
    by_external_id: HashMap<String, usize>,
    unavailable: bool,
}

/// Holds runs and posts in memory behind a mutex. Every operation is atomic
/// with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with
    /// [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.unavailable = unavailable;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        if inner.unavailable {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(inner)
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n + 1)
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_if_absent(&self, post: NewPost) -> Result<StoredPost, StoreError> {
        let mut inner = self.lock()?;
        if let Some(&idx) = inner.by_external_id.get(&post.external_id) {
            return Ok(inner.posts[idx].clone());
        }

        let stored = StoredPost {
            id: next_id(inner.posts.len()),
            external_id: post.external_id,
            analysis_run_id: post.analysis_run_id,
            kind: post.kind,
            author: post.author,
            text: post.text,
            created_at: post.created_at,
            sentiment: post.sentiment,
            confidence: post.confidence,
            likes: post.likes,
            replies: post.replies,
            retweets: post.retweets,
            stored_at: Utc::now(),
        };
        let idx = inner.posts.len();
        inner.by_external_id.insert(stored.external_id.clone(), idx);
        inner.posts.push(stored.clone());
        Ok(stored)
    }

    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.by_external_id.contains_key(external_id))
    }

    async fn existing_ids(&self, external_ids: &[String]) -> Result<HashSet<String>, StoreError> {
        let inner = self.lock()?;
        Ok(external_ids
            .iter()
            .filter(|id| inner.by_external_id.contains_key(id.as_str()))
            .cloned()
            .collect())
    }

    async fn create_run(
        &self,
        subject: &str,
        parameters: &RunParameters,
    ) -> Result<AnalysisRun, StoreError> {
        let mut inner = self.lock()?;
        let run = AnalysisRun {
            id: next_id(inner.runs.len()),
            public_id: Uuid::new_v4(),
            subject: subject.to_string(),
            parameters: parameters.clone(),
            created_at: Utc::now(),
            summary: None,
            post_count: None,
        };
        inner.runs.push(run.clone());
        Ok(run)
    }

    async fn set_run_summary(
        &self,
        run_id: i64,
        summary: &SentimentSummary,
        post_count: u32,
    ) -> Result<AnalysisRun, StoreError> {
        let mut inner = self.lock()?;
        let run = inner
            .runs
            .iter_mut()
            .find(|r| r.id == run_id)
            .ok_or(StoreError::RunNotFound(run_id))?;
        if run.summary.is_some() {
            return Err(StoreError::InvalidRunTransition { run_id });
        }
        run.summary = Some(*summary);
        run.post_count = Some(post_count);
        Ok(run.clone())
    }

    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<StoredPost>, StoreError> {
        let inner = self.lock()?;
        let subjects: HashMap<i64, &str> = inner
            .runs
            .iter()
            .map(|r| (r.id, r.subject.as_str()))
            .collect();

        let mut posts: Vec<StoredPost> = inner
            .posts
            .iter()
            .filter(|p| filter.matches(p, subjects.get(&p.analysis_run_id).copied()))
            .cloned()
            .collect();

        if filter.order_by == PostOrder::ConfidenceDesc {
            // Stable sort keeps insertion order among equal confidences.
            posts.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        }
        if let Some(limit) = filter.limit {
            posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(posts)
    }

    async fn query_runs(&self, subject: &str) -> Result<Vec<AnalysisRun>, StoreError> {
        let inner = self.lock()?;
        let mut runs: Vec<AnalysisRun> = inner
            .runs
            .iter()
            .filter(|r| r.subject == subject)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use postpulse_core::{PostKind, RawPost, Sentiment};

    use super::*;

    fn post(id: &str, run_id: i64, sentiment: Sentiment, confidence: f64) -> NewPost {
        let raw = RawPost::new(id, PostKind::Reply, "ferris", "text", "2024-01-01");
        NewPost::scored(raw, run_id, sentiment, confidence).unwrap()
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_first_row() {
        let store = MemoryStore::new();
        let first = store
            .insert_if_absent(post("1", 1, Sentiment::Positive, 0.9))
            .await
            .unwrap();
        let second = store
            .insert_if_absent(post("1", 2, Sentiment::Negative, 0.1))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.analysis_run_id, 1);
        assert!(store.exists("1").await.unwrap());
        assert!(!store.exists("2").await.unwrap());
    }

    #[tokio::test]
    async fn query_filters_by_subject_and_orders_by_confidence() {
        let store = MemoryStore::new();
        let params = RunParameters::search(5, 200).unwrap();
        let rust = store.create_run("rustlang", &params).await.unwrap();
        let go = store.create_run("golang", &params).await.unwrap();

        for (id, run, sentiment, confidence) in [
            ("a", rust.id, Sentiment::Positive, 0.6),
            ("b", rust.id, Sentiment::Positive, 0.9),
            ("c", rust.id, Sentiment::Negative, 0.99),
            ("d", go.id, Sentiment::Positive, 0.95),
            ("e", rust.id, Sentiment::Positive, 0.9),
        ] {
            store
                .insert_if_absent(post(id, run, sentiment, confidence))
                .await
                .unwrap();
        }

        let filter = PostFilter::for_subject("rustlang")
            .sentiment(Sentiment::Positive)
            .order_by(PostOrder::ConfidenceDesc)
            .limit(2);
        let ids: Vec<String> = store
            .query_posts(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.external_id)
            .collect();
        assert_eq!(ids, ["b", "e"]);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.exists("1").await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(!store.exists("1").await.unwrap());
    }

    #[tokio::test]
    async fn summary_of_unknown_run_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .set_run_summary(42, &SentimentSummary::zero(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RunNotFound(42)));
    }
}
