use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::domain::{Match, ScoreStatus, SwipeDirection, SwipeEvent, SwipeResult};

/// Response for the record swipe endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSwipeResponse {
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
    pub deferred: bool,
}

impl From<SwipeResult> for RecordSwipeResponse {
    fn from(result: SwipeResult) -> Self {
        Self {
            is_match: result.is_match,
            match_id: result.match_id,
            deferred: result.deferred,
        }
    }
}

/// One match as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    #[serde(rename = "studentId", skip_serializing_if = "Option::is_none", default)]
    pub student_id: Option<String>,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "facultyId")]
    pub faculty_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl MatchSummary {
    /// Student view: the student id is the caller and is omitted
    pub fn for_student(m: Match) -> Self {
        Self {
            match_id: m.id,
            student_id: None,
            listing_id: m.listing_id,
            faculty_id: m.faculty_id,
            created_at: m.created_at,
        }
    }

    pub fn for_faculty(m: Match) -> Self {
        Self {
            match_id: m.id,
            student_id: Some(m.student_id),
            listing_id: m.listing_id,
            faculty_id: m.faculty_id,
            created_at: m.created_at,
        }
    }
}

/// Response for match listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMatchesResponse {
    pub matches: Vec<MatchSummary>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Swipe state as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeStatusResponse {
    #[serde(rename = "swipeId")]
    pub swipe_id: Uuid,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub direction: SwipeDirection,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "scoreStatus")]
    pub score_status: ScoreStatus,
    pub score: Option<f64>,
    pub matched: bool,
}

impl From<SwipeEvent> for SwipeStatusResponse {
    fn from(swipe: SwipeEvent) -> Self {
        Self {
            swipe_id: swipe.id,
            listing_id: swipe.listing_id,
            direction: swipe.direction,
            created_at: swipe.created_at,
            score_status: swipe.score_state.status(),
            score: swipe.score_state.score(),
            matched: swipe.score_state.matched(),
        }
    }
}

/// Response for the swipe history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSwipesResponse {
    pub swipes: Vec<SwipeStatusResponse>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
