//! `HttpScorer` against a mock classification service.

use std::sync::Arc;
use std::time::Duration;

use postpulse_core::Sentiment;
use postpulse_sentiment::{HttpScorer, RawScore, ScorerAdapter, SentimentError, SentimentScorer};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scorer(server: &MockServer, batch_size: usize) -> HttpScorer {
    HttpScorer::new(&server.uri(), Duration::from_secs(5), batch_size).unwrap()
}

#[tokio::test]
async fn scores_texts_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "inputs": ["love it", "meh"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [{ "label": "LABEL_2", "score": 0.91 }, { "label": "LABEL_1", "score": 0.06 }],
            { "label": "LABEL_1", "score": 0.66 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let scores = scorer(&server, 64).score(&["love it", "meh"]).await.unwrap();
    assert_eq!(
        scores,
        [RawScore::new("LABEL_2", 0.91), RawScore::new("LABEL_1", 0.66)]
    );
}

#[tokio::test]
async fn large_inputs_are_chunked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "inputs": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "label": "LABEL_0", "score": 0.9 },
            { "label": "LABEL_0", "score": 0.8 }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "inputs": ["c"] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "label": "LABEL_2", "score": 0.7 }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ScorerAdapter::new(Arc::new(scorer(&server, 2)));
    let scored = adapter.score(&["a", "b", "c"]).await.unwrap();
    let labels: Vec<Sentiment> = scored.iter().map(|s| s.sentiment).collect();
    assert_eq!(
        labels,
        [Sentiment::Negative, Sentiment::Negative, Sentiment::Positive]
    );
}

#[tokio::test]
async fn short_response_is_a_scoring_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "label": "LABEL_2", "score": 0.7 }])),
        )
        .mount(&server)
        .await;

    let err = scorer(&server, 64).score(&["a", "b"]).await.unwrap_err();
    assert!(matches!(err, SentimentError::ScoringFailure(_)), "{err}");
}

#[tokio::test]
async fn server_error_is_a_scoring_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = scorer(&server, 64).score(&["a"]).await.unwrap_err();
    assert!(matches!(err, SentimentError::ScoringFailure(_)), "{err}");
}
