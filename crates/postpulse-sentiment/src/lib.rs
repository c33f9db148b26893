//! Sentiment ingest core for postpulse.
//!
//! Deduplicates raw social posts against the store, scores only the new ones
//! in a single batched classifier call, persists them under a fresh analysis
//! run and records the run's label shares. Read-side helpers aggregate stored
//! posts into summaries, period distributions and per-subject reports.

pub mod aggregate;
pub mod error;
pub mod ledger;
pub mod memory_store;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod sources;
pub mod types;

pub use aggregate::{bucket, parse_timestamp, period_key, summarize, summarize_labels, Labeled};
pub use error::SentimentError;
pub use ledger::Ledger;
pub use memory_store::MemoryStore;
pub use pipeline::ingest;
pub use report::{
    period_distribution, run_posts, subject_report, subject_summary, top_posts, SubjectReport,
    DEFAULT_TOP_N,
};
pub use scorer::{
    build_scorer, lexicon_score, normalize_label, shared_scorer, HttpScorer, LexiconScorer,
    RawScore, ScoredText, ScorerAdapter, SentimentScorer,
};
pub use sources::{normalize_handle, BirdSource, PostSource, SourceError};
pub use types::SentimentConfig;
