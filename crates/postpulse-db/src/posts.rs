//! Database operations for the `posts` table.

use chrono::{DateTime, Utc};
use postpulse_core::{NewPost, PostFilter, PostOrder, StoredPost};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub external_id: String,
    pub analysis_run_id: i64,
    pub kind: String,
    pub author: String,
    pub body: String,
    pub created_at: String,
    pub sentiment: String,
    pub confidence: f64,
    pub likes: i64,
    pub replies: i64,
    pub retweets: i64,
    pub stored_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for StoredPost {
    type Error = DbError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|e| DbError::Corrupt(format!("post {}: {e}", row.external_id)))?;
        let sentiment = row
            .sentiment
            .parse()
            .map_err(|e| DbError::Corrupt(format!("post {}: {e}", row.external_id)))?;

        Ok(StoredPost {
            id: row.id,
            external_id: row.external_id,
            analysis_run_id: row.analysis_run_id,
            kind,
            author: row.author,
            text: row.body,
            created_at: row.created_at,
            sentiment,
            confidence: row.confidence,
            likes: row.likes,
            replies: row.replies,
            retweets: row.retweets,
            stored_at: row.stored_at,
        })
    }
}

const POST_COLUMNS: &str = "p.id, p.external_id, p.analysis_run_id, p.kind, p.author, p.body, \
                            p.created_at, p.sentiment, p.confidence, p.likes, p.replies, \
                            p.retweets, p.stored_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a post unless one with the same `external_id` already exists.
///
/// Relies on the `UNIQUE (external_id)` constraint: the insert is a no-op on
/// conflict and the existing row is read back instead, so concurrent callers
/// all receive the single stored row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the conflicting row vanished between the
/// insert and the read-back, or [`DbError::Sqlx`] if either query fails.
pub async fn insert_post_if_absent(pool: &PgPool, post: &NewPost) -> Result<PostRow, DbError> {
    let inserted = sqlx::query_as::<_, PostRow>(&format!(
        "INSERT INTO posts AS p \
             (external_id, analysis_run_id, kind, author, body, created_at, \
              sentiment, confidence, likes, replies, retweets) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (external_id) DO NOTHING \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(&post.external_id)
    .bind(post.analysis_run_id)
    .bind(post.kind.as_str())
    .bind(&post.author)
    .bind(&post.text)
    .bind(&post.created_at)
    .bind(post.sentiment.as_str())
    .bind(post.confidence)
    .bind(post.likes)
    .bind(post.replies)
    .bind(post.retweets)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok(row);
    }

    get_post_by_external_id(pool, &post.external_id)
        .await?
        .ok_or(DbError::NotFound)
}

/// Returns the post with `external_id`, or `None` if it is not stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_post_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts p WHERE p.external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Whether a post with `external_id` is stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn post_exists(pool: &PgPool, external_id: &str) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE external_id = $1)")
            .bind(external_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Returns the subset of `external_ids` that are already stored, in one query.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_external_ids(
    pool: &PgPool,
    external_ids: &[String],
) -> Result<Vec<String>, DbError> {
    if external_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> =
        sqlx::query_scalar("SELECT external_id FROM posts WHERE external_id = ANY($1)")
            .bind(external_ids)
            .fetch_all(pool)
            .await?;

    Ok(ids)
}

/// Lists posts matching `filter`.
///
/// A `subject` filter joins through `analysis_runs`, so it matches posts owned
/// by any run for that subject.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts(pool: &PgPool, filter: &PostFilter) -> Result<Vec<PostRow>, DbError> {
    let mut query = build_list_posts_query(filter);
    let rows = query.build_query_as::<PostRow>().fetch_all(pool).await?;
    Ok(rows)
}

fn build_list_posts_query(filter: &PostFilter) -> QueryBuilder<'_, Postgres> {
    let mut query: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p"));

    if filter.subject.is_some() {
        query.push(" JOIN analysis_runs r ON r.id = p.analysis_run_id");
    }

    query.push(" WHERE TRUE");
    if let Some(run_id) = filter.run_id {
        query.push(" AND p.analysis_run_id = ").push_bind(run_id);
    }
    if let Some(subject) = filter.subject.as_deref() {
        query.push(" AND r.subject = ").push_bind(subject);
    }
    if let Some(sentiment) = filter.sentiment {
        query.push(" AND p.sentiment = ").push_bind(sentiment.as_str());
    }
    if let Some(kind) = filter.kind {
        query.push(" AND p.kind = ").push_bind(kind.as_str());
    }

    match filter.order_by {
        PostOrder::Stored => query.push(" ORDER BY p.id"),
        PostOrder::ConfidenceDesc => query.push(" ORDER BY p.confidence DESC, p.id"),
    };

    if let Some(limit) = filter.limit {
        query.push(" LIMIT ").push_bind(i64::from(limit));
    }

    query
}
