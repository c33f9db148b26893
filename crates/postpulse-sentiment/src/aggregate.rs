//! Summaries and period distributions over scored posts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use postpulse_core::{Granularity, NewPost, PeriodBucket, Sentiment, SentimentSummary, StoredPost};

use crate::error::SentimentError;

const SUMMARY_PLACES: i32 = 2;
const BUCKET_PLACES: i32 = 3;

/// Twitter's legacy `created_at` layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const TWITTER_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";
const OFFSET_FORMATS: &[&str] = &[TWITTER_FORMAT, "%Y-%m-%d %H:%M:%S%.f%:z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Anything carrying a sentiment label and a source timestamp.
pub trait Labeled {
    fn sentiment(&self) -> Sentiment;
    fn created_at(&self) -> &str;
}

impl Labeled for StoredPost {
    fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

impl Labeled for NewPost {
    fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    positive: u32,
    neutral: u32,
    negative: u32,
}

impl Counts {
    fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Unknown => {}
        }
    }

    fn total(self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    fn ratios(self, places: i32) -> (f64, f64, f64) {
        let total = self.total();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let share = |n: u32| round_to(f64::from(n) / f64::from(total), places);
        (share(self.positive), share(self.neutral), share(self.negative))
    }
}

/// Rounds to `places` decimals, exact halves to even.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Share of each known label among `sentiments`, rounded to two decimals.
///
/// [`Sentiment::Unknown`] is excluded from both numerator and denominator.
/// Returns all zeros when nothing known is present.
#[must_use]
pub fn summarize_labels<I>(sentiments: I) -> SentimentSummary
where
    I: IntoIterator<Item = Sentiment>,
{
    let mut counts = Counts::default();
    for sentiment in sentiments {
        counts.add(sentiment);
    }
    let (positive, neutral, negative) = counts.ratios(SUMMARY_PLACES);
    SentimentSummary {
        positive,
        neutral,
        negative,
    }
}

/// [`summarize_labels`] over posts.
#[must_use]
pub fn summarize<'a, P, I>(posts: I) -> SentimentSummary
where
    P: Labeled + 'a,
    I: IntoIterator<Item = &'a P>,
{
    summarize_labels(posts.into_iter().map(Labeled::sentiment))
}

/// Parses a source timestamp.
///
/// Accepts RFC 3339, Twitter's legacy layout, `YYYY-MM-DD HH:MM:SS[.f]` with
/// or without an offset, naive ISO 8601 and a bare date. Offsets are dropped,
/// not converted: the wall-clock time as written is returned.
///
/// # Errors
///
/// Returns [`SentimentError::MalformedTimestamp`] if no layout matches.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SentimentError> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.naive_local());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SentimentError::MalformedTimestamp(raw.to_string()))
}

/// The bucket key for `raw`: `YYYY-MM` or `YYYY-Www`.
///
/// Weeks start on Sunday; days before the year's first Sunday fall in week
/// `00`.
///
/// # Errors
///
/// Returns [`SentimentError::MalformedTimestamp`] if `raw` cannot be parsed.
pub fn period_key(raw: &str, granularity: Granularity) -> Result<String, SentimentError> {
    let dt = parse_timestamp(raw)?;
    let format = match granularity {
        Granularity::Monthly => "%Y-%m",
        Granularity::Weekly => "%Y-W%U",
    };
    Ok(dt.format(format).to_string())
}

/// Groups posts into calendar periods and reports per-period label shares.
///
/// Buckets are sparse and ascending by key. Ratios are rounded to three
/// decimals. Posts with [`Sentiment::Unknown`] count toward no bucket, and a
/// period holding only such posts is omitted.
///
/// # Errors
///
/// Returns [`SentimentError::MalformedTimestamp`] if any post's timestamp
/// cannot be parsed.
pub fn bucket<'a, P, I>(posts: I, granularity: Granularity) -> Result<Vec<PeriodBucket>, SentimentError>
where
    P: Labeled + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut grouped: BTreeMap<String, Counts> = BTreeMap::new();
    for post in posts {
        let key = period_key(post.created_at(), granularity)?;
        grouped.entry(key).or_default().add(post.sentiment());
    }

    Ok(grouped
        .into_iter()
        .filter(|(_, counts)| counts.total() > 0)
        .map(|(period, counts)| {
            let (positive_ratio, neutral_ratio, negative_ratio) = counts.ratios(BUCKET_PLACES);
            PeriodBucket {
                period,
                total: counts.total(),
                positive_ratio,
                neutral_ratio,
                negative_ratio,
            }
        })
        .collect())
}
