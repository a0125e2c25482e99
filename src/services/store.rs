use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use crate::models::{Match, SwipeEvent};

/// Errors raised by a swipe store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// A unique key was already taken when the write landed
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Outcome of moving a swipe from `pending` to `scored`
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreWrite {
    /// The transition happened; carries the persisted match, if the swipe qualified
    Applied(Option<Match>),
    /// Another resolver scored the swipe first; nothing was written
    AlreadyScored,
}

/// Persistent home of swipe events and matches
///
/// Implementations must enforce uniqueness of (user_id, listing_id) for swipes
/// and (student_id, listing_id) for matches at write time.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Insert a swipe if no swipe exists for its (user, listing) pair.
    /// Returns `StoreError::Conflict` when the pair is taken.
    async fn insert_swipe(&self, swipe: &SwipeEvent) -> Result<(), StoreError>;

    async fn get_swipe(&self, swipe_id: Uuid) -> Result<Option<SwipeEvent>, StoreError>;

    async fn find_swipe(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> Result<Option<SwipeEvent>, StoreError>;

    /// All swipes made by a user, newest first
    async fn list_swipes(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError>;

    /// Pending swipes, up to `limit`. Swipes never attempted come first, then
    /// the least recently attempted; ties go to the oldest swipe.
    async fn list_pending(&self, limit: usize) -> Result<Vec<SwipeEvent>, StoreError>;

    /// Note a reconciliation attempt on a swipe, moving it behind every swipe
    /// attempted earlier in `list_pending` order
    async fn mark_attempted(&self, swipe_id: Uuid) -> Result<(), StoreError>;

    /// Record the score of a pending swipe and, when `new_match` is given,
    /// create the match in the same unit of work. An existing match for the
    /// pair is kept and returned instead of the new one.
    async fn record_score(
        &self,
        swipe_id: Uuid,
        score: f64,
        new_match: Option<Match>,
    ) -> Result<ScoreWrite, StoreError>;

    async fn find_match(
        &self,
        student_id: &str,
        listing_id: &str,
    ) -> Result<Option<Match>, StoreError>;

    /// Matches where the user is the student, newest first
    async fn list_matches_for_student(&self, student_id: &str) -> Result<Vec<Match>, StoreError>;

    /// Matches on listings owned by a faculty member, newest first
    async fn list_matches_for_faculty(&self, faculty_id: &str) -> Result<Vec<Match>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
