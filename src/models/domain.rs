use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

/// The authenticated user making a request
///
/// Users are owned by the external identity system; the engine only ever
/// sees the id and the role asserted by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn student(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Student,
        }
    }

    pub fn faculty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Faculty,
        }
    }
}

/// Research listing as served by the external listing store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "facultyId")]
    pub faculty_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Listing {
    /// Text handed to the compatibility scorer for this listing
    pub fn listing_text(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.requirements.as_str(),
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

fn default_true() -> bool { true }

/// Direction of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Interested,
    Passed,
}

impl SwipeDirection {
    pub fn from_interested(interested: bool) -> Self {
        if interested {
            SwipeDirection::Interested
        } else {
            SwipeDirection::Passed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Interested => "interested",
            SwipeDirection::Passed => "passed",
        }
    }
}

/// Flat score status as exposed to callers and stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    NotApplicable,
    Pending,
    Scored,
}

/// Scoring state of a swipe
///
/// `Pending` is the only state that may transition, and only to `Scored`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreState {
    NotApplicable,
    Pending,
    Scored { score: f64, matched: bool },
}

impl ScoreState {
    /// Starting state for a freshly recorded swipe
    pub fn initial(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Interested => ScoreState::Pending,
            SwipeDirection::Passed => ScoreState::NotApplicable,
        }
    }

    pub fn status(&self) -> ScoreStatus {
        match self {
            ScoreState::NotApplicable => ScoreStatus::NotApplicable,
            ScoreState::Pending => ScoreStatus::Pending,
            ScoreState::Scored { .. } => ScoreStatus::Scored,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            ScoreState::Scored { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn matched(&self) -> bool {
        matches!(self, ScoreState::Scored { matched: true, .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ScoreState::Pending)
    }
}

/// One recorded swipe; at most one exists per (user, listing)
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeEvent {
    pub id: Uuid,
    pub user_id: String,
    pub listing_id: String,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
    pub score_state: ScoreState,
}

impl SwipeEvent {
    pub fn new(user_id: &str, listing_id: &str, direction: SwipeDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            listing_id: listing_id.to_string(),
            direction,
            created_at: Utc::now(),
            score_state: ScoreState::initial(direction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Active,
    PendingScore,
}

/// Durable pairing of a student with a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub student_id: String,
    pub listing_id: String,
    pub faculty_id: String,
    pub swipe_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: MatchStatus,
}

impl Match {
    /// Build the match a scored swipe qualifies for
    pub fn for_swipe(swipe: &SwipeEvent, faculty_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: swipe.user_id.clone(),
            listing_id: swipe.listing_id.clone(),
            faculty_id: faculty_id.to_string(),
            swipe_id: swipe.id,
            created_at: Utc::now(),
            status: MatchStatus::Active,
        }
    }
}

/// Compatibility estimate returned by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub score: f64,
    pub recommend: bool,
}

impl CompatibilityScore {
    pub const MIN_SCORE: f64 = 0.0;
    pub const MAX_SCORE: f64 = 100.0;

    /// Clamp the score into `0..=100`; `None` when it is NaN or infinite
    pub fn normalized(self) -> Option<Self> {
        self.score.is_finite().then(|| Self {
            score: self.score.clamp(Self::MIN_SCORE, Self::MAX_SCORE),
            recommend: self.recommend,
        })
    }

    /// Match rule: an explicit recommendation or a score at or above the threshold
    #[inline]
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.recommend || self.score >= threshold
    }
}

/// Outcome of resolving a right-swipe
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDecision {
    pub is_match: bool,
    pub match_id: Option<Uuid>,
    pub score: Option<f64>,
    pub deferred: bool,
}

impl MatchDecision {
    pub fn deferred() -> Self {
        Self {
            is_match: false,
            match_id: None,
            score: None,
            deferred: true,
        }
    }

    pub fn not_applicable() -> Self {
        Self {
            is_match: false,
            match_id: None,
            score: None,
            deferred: false,
        }
    }

    pub fn scored(score: f64, matched: Option<&Match>) -> Self {
        Self {
            is_match: matched.is_some(),
            match_id: matched.map(|m| m.id),
            score: Some(score),
            deferred: false,
        }
    }
}

/// Result returned to the caller of `record_swipe`
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeResult {
    pub swipe_id: Uuid,
    pub is_match: bool,
    pub match_id: Option<Uuid>,
    pub deferred: bool,
}

impl SwipeResult {
    pub fn passed(swipe: &SwipeEvent) -> Self {
        Self {
            swipe_id: swipe.id,
            is_match: false,
            match_id: None,
            deferred: false,
        }
    }

    pub fn from_decision(swipe: &SwipeEvent, decision: &MatchDecision) -> Self {
        Self {
            swipe_id: swipe.id,
            is_match: decision.is_match,
            match_id: decision.match_id,
            deferred: decision.deferred,
        }
    }
}

/// Summary of one reconciliation sweep over pending swipes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub examined: usize,
    pub matched: usize,
    pub scored_no_match: usize,
    pub still_pending: usize,
    pub failed: usize,
}
