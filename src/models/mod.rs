// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Caller, CompatibilityScore, Listing, Match, MatchDecision, MatchStatus, ReconcileReport, Role,
    ScoreState, ScoreStatus, SwipeDirection, SwipeEvent, SwipeResult,
};
pub use requests::RecordSwipeRequest;
pub use responses::{
    ErrorResponse, HealthResponse, ListMatchesResponse, ListSwipesResponse, MatchSummary,
    RecordSwipeResponse, SwipeStatusResponse,
};
