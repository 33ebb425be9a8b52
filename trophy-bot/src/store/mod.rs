//! Per-user record storage.
//!
//! One row per chat identity holding the display name, last access time and
//! the two counters (reward rating and quiz score). Rows are created lazily
//! and never deleted.

mod sqlite;

pub use sqlite::SqliteUserStore;

use chrono::Utc;
use serde::Serialize;

/// Persisted state of one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    /// Chat identity (Telegram user id)
    pub user_id: i64,
    /// Full name as last seen
    pub display_name: String,
    /// Unix time of the last write, in seconds
    pub last_access: Option<f64>,
    /// Number of successful reward draws
    pub rating: i64,
    /// Number of correct quiz answers
    pub quiz_score: i64,
}

impl UserRecord {
    /// A freshly materialized user with both counters at zero.
    pub fn new(user_id: i64, display_name: &str) -> Self {
        Self {
            user_id,
            display_name: display_name.to_string(),
            last_access: Some(now_timestamp()),
            rating: 0,
            quiz_score: 0,
        }
    }

    pub fn score(&self, field: CounterField) -> i64 {
        match field {
            CounterField::Rating => self.rating,
            CounterField::QuizScore => self.quiz_score,
        }
    }
}

/// Counters that can be written through [`UserStore::upsert`] and
/// [`UserStore::increment`].
///
/// Each variant maps to a fixed column; column names never come from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Rating,
    QuizScore,
}

impl CounterField {
    pub fn column(self) -> &'static str {
        match self {
            CounterField::Rating => "rating",
            CounterField::QuizScore => "quiz_score",
        }
    }
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub score: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    IoError(String),
}

/// Relational store of user records.
///
/// Every write is durable when the call returns.
pub trait UserStore: Send + Sync {
    /// Create the users table if it does not exist.
    fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Point lookup. A missing row is `Ok(None)`.
    fn get(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// Insert the row with `field = value`, or set `field` on the existing row.
    /// Also refreshes the display name.
    fn upsert(
        &self,
        user_id: i64,
        display_name: &str,
        field: CounterField,
        value: i64,
    ) -> Result<(), StoreError>;

    /// Atomically add one to `field` and return the new value.
    fn increment(
        &self,
        user_id: i64,
        display_name: &str,
        field: CounterField,
    ) -> Result<i64, StoreError>;

    /// Refresh display name and last access of an existing row.
    fn touch(&self, user_id: i64, display_name: &str) -> Result<(), StoreError>;

    /// Top `limit` users by `field`, highest first, ties by ascending user id.
    fn top_n(&self, field: CounterField, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Number of known users.
    fn count(&self) -> Result<u64, StoreError>;

    /// Find or create a user. Returns the user.
    ///
    /// New users are written with both counters at zero before anything else
    /// happens, so a `get` right after always finds the row.
    fn ensure_user(&self, user_id: i64, display_name: &str) -> Result<UserRecord, StoreError> {
        match self.get(user_id)? {
            Some(mut record) => {
                self.touch(user_id, display_name)?;
                record.display_name = display_name.to_string();
                Ok(record)
            }
            None => {
                self.upsert(user_id, display_name, CounterField::Rating, 0)?;
                self.upsert(user_id, display_name, CounterField::QuizScore, 0)?;
                tracing::info!(user_id, "Created new user: {}", display_name);
                Ok(UserRecord::new(user_id, display_name))
            }
        }
    }
}

/// Current unix time in seconds, as stored in `last_access`.
pub(crate) fn now_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
