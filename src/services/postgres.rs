use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;
use crate::models::{Match, MatchStatus, ScoreState, ScoreStatus, SwipeDirection, SwipeEvent};
use crate::services::store::{ScoreWrite, StoreError, SwipeStore};

/// Swipe direction as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_direction", rename_all = "lowercase")]
pub enum PgDirection {
    Interested,
    Passed,
}

impl From<SwipeDirection> for PgDirection {
    fn from(value: SwipeDirection) -> Self {
        match value {
            SwipeDirection::Interested => PgDirection::Interested,
            SwipeDirection::Passed => PgDirection::Passed,
        }
    }
}

impl From<PgDirection> for SwipeDirection {
    fn from(value: PgDirection) -> Self {
        match value {
            PgDirection::Interested => SwipeDirection::Interested,
            PgDirection::Passed => SwipeDirection::Passed,
        }
    }
}

/// Score status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "score_status", rename_all = "snake_case")]
pub enum PgScoreStatus {
    NotApplicable,
    Pending,
    Scored,
}

impl From<ScoreStatus> for PgScoreStatus {
    fn from(value: ScoreStatus) -> Self {
        match value {
            ScoreStatus::NotApplicable => PgScoreStatus::NotApplicable,
            ScoreStatus::Pending => PgScoreStatus::Pending,
            ScoreStatus::Scored => PgScoreStatus::Scored,
        }
    }
}

/// Match status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
pub enum PgMatchStatus {
    Active,
    PendingScore,
}

impl From<MatchStatus> for PgMatchStatus {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Active => PgMatchStatus::Active,
            MatchStatus::PendingScore => PgMatchStatus::PendingScore,
        }
    }
}

impl From<PgMatchStatus> for MatchStatus {
    fn from(value: PgMatchStatus) -> Self {
        match value {
            PgMatchStatus::Active => MatchStatus::Active,
            PgMatchStatus::PendingScore => MatchStatus::PendingScore,
        }
    }
}

const SWIPE_COLUMNS: &str =
    "id, user_id, listing_id, direction, score_status, score, matched, created_at";

const MATCH_COLUMNS: &str =
    "id, student_id, listing_id, faculty_id, swipe_id, status, created_at";

/// PostgreSQL-backed swipe store
///
/// Uniqueness of swipes and matches is enforced by the unique constraints in
/// `migrations/`; every insert is an `INSERT ... ON CONFLICT DO NOTHING` so
/// the loser of a race learns about it from the affected row count.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    async fn fetch_swipes(
        &self,
        query: &str,
        bind: &str,
    ) -> Result<Vec<SwipeEvent>, StoreError> {
        let rows = sqlx::query(query).bind(bind).fetch_all(&self.pool).await?;
        rows.iter().map(swipe_from_row).collect()
    }

    async fn fetch_matches(&self, query: &str, bind: &str) -> Result<Vec<Match>, StoreError> {
        let rows = sqlx::query(query).bind(bind).fetch_all(&self.pool).await?;
        rows.iter().map(match_from_row).collect()
    }
}

fn swipe_from_row(row: &PgRow) -> Result<SwipeEvent, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let direction: PgDirection = row.try_get("direction")?;
    let status: PgScoreStatus = row.try_get("score_status")?;
    let score: Option<f64> = row.try_get("score")?;
    let matched: bool = row.try_get("matched")?;

    let score_state = match (status, score) {
        (PgScoreStatus::NotApplicable, _) => ScoreState::NotApplicable,
        (PgScoreStatus::Pending, _) => ScoreState::Pending,
        (PgScoreStatus::Scored, Some(score)) => ScoreState::Scored { score, matched },
        (PgScoreStatus::Scored, None) => {
            return Err(StoreError::CorruptRow(format!(
                "swipe {} is scored without a score",
                id
            )))
        }
    };

    Ok(SwipeEvent {
        id,
        user_id: row.try_get("user_id")?,
        listing_id: row.try_get("listing_id")?,
        direction: direction.into(),
        created_at: row.try_get("created_at")?,
        score_state,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    let status: PgMatchStatus = row.try_get("status")?;

    Ok(Match {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        listing_id: row.try_get("listing_id")?,
        faculty_id: row.try_get("faculty_id")?,
        swipe_id: row.try_get("swipe_id")?,
        created_at: row.try_get("created_at")?,
        status: status.into(),
    })
}

/// Translate a unique-constraint violation into a write conflict
fn conflict_or(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(what.to_string())
        }
        _ => StoreError::SqlxError(err),
    }
}

#[async_trait]
impl SwipeStore for PostgresClient {
    async fn insert_swipe(&self, swipe: &SwipeEvent) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO swipe_events (id, user_id, listing_id, direction, score_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, listing_id) DO NOTHING
        "#;

        let what = format!("swipe ({}, {})", swipe.user_id, swipe.listing_id);

        let result = sqlx::query(query)
            .bind(swipe.id)
            .bind(&swipe.user_id)
            .bind(&swipe.listing_id)
            .bind(PgDirection::from(swipe.direction))
            .bind(PgScoreStatus::from(swipe.score_state.status()))
            .bind(swipe.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or(e, &what))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(what));
        }

        tracing::debug!(
            "Recorded swipe: {} -> {} ({:?})",
            swipe.user_id,
            swipe.listing_id,
            swipe.direction
        );

        Ok(())
    }

    async fn get_swipe(&self, swipe_id: Uuid) -> Result<Option<SwipeEvent>, StoreError> {
        let query = format!("SELECT {} FROM swipe_events WHERE id = $1", SWIPE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(swipe_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(swipe_from_row).transpose()
    }

    async fn find_swipe(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> Result<Option<SwipeEvent>, StoreError> {
        let query = format!(
            "SELECT {} FROM swipe_events WHERE user_id = $1 AND listing_id = $2",
            SWIPE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(swipe_from_row).transpose()
    }

    async fn list_swipes(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError> {
        let query = format!(
            "SELECT {} FROM swipe_events WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            SWIPE_COLUMNS
        );
        self.fetch_swipes(&query, user_id).await
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<SwipeEvent>, StoreError> {
        let query = format!(
            "SELECT {} FROM swipe_events WHERE score_status = 'pending' \
             ORDER BY last_attempted_at ASC NULLS FIRST, created_at ASC, id ASC LIMIT $1",
            SWIPE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(swipe_from_row).collect()
    }

    async fn mark_attempted(&self, swipe_id: Uuid) -> Result<(), StoreError> {
        // clock_timestamp() so attempts made in one sweep keep their order
        let result = sqlx::query(
            "UPDATE swipe_events SET last_attempted_at = clock_timestamp() WHERE id = $1",
        )
        .bind(swipe_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("swipe {}", swipe_id)));
        }

        Ok(())
    }

    async fn record_score(
        &self,
        swipe_id: Uuid,
        score: f64,
        new_match: Option<Match>,
    ) -> Result<ScoreWrite, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Locks the swipe row, so concurrent resolvers of the same swipe serialize here
        let updated = sqlx::query(
            r#"
            UPDATE swipe_events
            SET score_status = $2, score = $3, matched = $4, scored_at = NOW()
            WHERE id = $1 AND score_status = $5
            "#,
        )
        .bind(swipe_id)
        .bind(PgScoreStatus::Scored)
        .bind(score)
        .bind(new_match.is_some())
        .bind(PgScoreStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return match self.get_swipe(swipe_id).await? {
                Some(_) => Ok(ScoreWrite::AlreadyScored),
                None => Err(StoreError::NotFound(format!("swipe {}", swipe_id))),
            };
        }

        let persisted = match new_match {
            Some(m) => {
                sqlx::query(
                    r#"
                    INSERT INTO matches (id, student_id, listing_id, faculty_id, swipe_id, status, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (student_id, listing_id) DO NOTHING
                    "#,
                )
                .bind(m.id)
                .bind(&m.student_id)
                .bind(&m.listing_id)
                .bind(&m.faculty_id)
                .bind(m.swipe_id)
                .bind(PgMatchStatus::from(m.status))
                .bind(m.created_at)
                .execute(&mut *tx)
                .await?;

                let query = format!(
                    "SELECT {} FROM matches WHERE student_id = $1 AND listing_id = $2",
                    MATCH_COLUMNS
                );
                let row = sqlx::query(&query)
                    .bind(&m.student_id)
                    .bind(&m.listing_id)
                    .fetch_one(&mut *tx)
                    .await?;

                Some(match_from_row(&row)?)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::debug!(
            "Scored swipe {} at {:.2} (matched: {})",
            swipe_id,
            score,
            persisted.is_some()
        );

        Ok(ScoreWrite::Applied(persisted))
    }

    async fn find_match(
        &self,
        student_id: &str,
        listing_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE student_id = $1 AND listing_id = $2",
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(student_id)
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches_for_student(&self, student_id: &str) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE student_id = $1 ORDER BY created_at DESC, id DESC",
            MATCH_COLUMNS
        );
        self.fetch_matches(&query, student_id).await
    }

    async fn list_matches_for_faculty(&self, faculty_id: &str) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE faculty_id = $1 ORDER BY created_at DESC, id DESC",
            MATCH_COLUMNS
        );
        self.fetch_matches(&query, faculty_id).await
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
