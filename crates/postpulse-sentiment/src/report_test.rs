use postpulse_core::{NewPost, RawPost};

use super::*;
use crate::memory_store::MemoryStore;

async fn seed(
    store: &MemoryStore,
    subject: &str,
    parameters: &RunParameters,
    posts: &[(&str, PostKind, Sentiment, f64, &str)],
) -> AnalysisRun {
    let run = store.create_run(subject, parameters).await.unwrap();
    for &(id, kind, sentiment, confidence, created_at) in posts {
        let raw = RawPost::new(id, kind, "ferris", format!("post {id}"), created_at);
        let post = NewPost::scored(raw, run.id, sentiment, confidence).unwrap();
        store.insert_if_absent(post).await.unwrap();
    }
    run
}

fn author_params() -> RunParameters {
    RunParameters::author(10, 30, 200).unwrap()
}

#[tokio::test]
async fn report_is_none_for_unknown_subject() {
    let store = MemoryStore::new();
    assert!(subject_report(&store, "nobody", DEFAULT_TOP_N)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn report_covers_all_runs_of_subject() {
    let store = MemoryStore::new();
    seed(
        &store,
        "ferris",
        &author_params(),
        &[
            ("1", PostKind::Original, Sentiment::Positive, 0.9, "2024-01-15"),
            ("2", PostKind::Reply, Sentiment::Positive, 0.7, "2024-01-16"),
            ("3", PostKind::Reply, Sentiment::Negative, 0.8, "2024-01-16"),
        ],
    )
    .await;
    seed(
        &store,
        "ferris",
        &author_params(),
        &[
            ("4", PostKind::Reply, Sentiment::Positive, 0.95, "2024-02-20"),
            ("5", PostKind::Reply, Sentiment::Unknown, 0.4, "2024-02-20"),
        ],
    )
    .await;
    seed(
        &store,
        "other",
        &author_params(),
        &[("6", PostKind::Reply, Sentiment::Negative, 0.99, "2024-02-20")],
    )
    .await;

    let report = subject_report(&store, "ferris", DEFAULT_TOP_N)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.runs.len(), 2);
    assert_eq!(report.total_posts, 5);
    assert_eq!(report.top_kind, Some(PostKind::Reply));
    // 3 positive, 1 negative; the unknown post is excluded.
    assert!((report.summary.positive - 0.75).abs() < 1e-9);
    assert!((report.summary.negative - 0.25).abs() < 1e-9);

    let positive: Vec<&str> = report
        .top_positive
        .iter()
        .map(|p| p.external_id.as_str())
        .collect();
    assert_eq!(positive, ["4", "2"]);
    assert!(report.top_neutral.is_empty());
    assert_eq!(report.top_negative.len(), 1);
    assert_eq!(report.top_negative[0].external_id, "3");
}

#[tokio::test]
async fn search_subject_report_draws_from_all_posts() {
    let store = MemoryStore::new();
    seed(
        &store,
        "rustlang",
        &RunParameters::search(50, 200).unwrap(),
        &[("1", PostKind::Original, Sentiment::Neutral, 0.6, "2024-01-15")],
    )
    .await;

    let report = subject_report(&store, "rustlang", 3).await.unwrap().unwrap();
    assert_eq!(report.top_kind, None);
    assert_eq!(report.top_neutral.len(), 1);
}

#[tokio::test]
async fn top_posts_respects_limit() {
    let store = MemoryStore::new();
    seed(
        &store,
        "ferris",
        &author_params(),
        &[
            ("1", PostKind::Reply, Sentiment::Positive, 0.5, "2024-01-15"),
            ("2", PostKind::Reply, Sentiment::Positive, 0.9, "2024-01-15"),
            ("3", PostKind::Reply, Sentiment::Positive, 0.7, "2024-01-15"),
        ],
    )
    .await;

    let top = top_posts(&store, "ferris", Sentiment::Positive, None, 2)
        .await
        .unwrap();
    let ids: Vec<&str> = top.iter().map(|p| p.external_id.as_str()).collect();
    assert_eq!(ids, ["2", "3"]);
}

#[tokio::test]
async fn distribution_spans_runs() {
    let store = MemoryStore::new();
    seed(
        &store,
        "ferris",
        &author_params(),
        &[("1", PostKind::Original, Sentiment::Positive, 0.9, "2024-02-20T08:00:00Z")],
    )
    .await;
    seed(
        &store,
        "ferris",
        &author_params(),
        &[("2", PostKind::Original, Sentiment::Negative, 0.9, "Mon Jan 15 10:00:00 +0000 2024")],
    )
    .await;

    let buckets = period_distribution(&store, "ferris", Granularity::Monthly)
        .await
        .unwrap();
    let periods: Vec<&str> = buckets.iter().map(|b| b.period.as_str()).collect();
    assert_eq!(periods, ["2024-01", "2024-02"]);
}

#[tokio::test]
async fn subject_summary_of_empty_subject_is_zero() {
    let store = MemoryStore::new();
    assert_eq!(
        subject_summary(&store, "nobody").await.unwrap(),
        SentimentSummary::zero()
    );
}

#[tokio::test]
async fn run_posts_are_scoped_to_run() {
    let store = MemoryStore::new();
    let first = seed(
        &store,
        "ferris",
        &author_params(),
        &[("1", PostKind::Original, Sentiment::Positive, 0.9, "2024-01-15")],
    )
    .await;
    seed(
        &store,
        "ferris",
        &author_params(),
        &[("2", PostKind::Original, Sentiment::Positive, 0.9, "2024-01-15")],
    )
    .await;

    let posts = run_posts(&store, first.id).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].external_id, "1");
}
