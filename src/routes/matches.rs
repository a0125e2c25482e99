use actix_web::{web, HttpResponse, Responder};
use crate::auth::AuthenticatedUser;
use crate::core::SwipeError;
use crate::models::{HealthResponse, ListMatchesResponse, MatchSummary};
use crate::routes::AppState;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/faculty", web::get().to(list_faculty_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.engine.query.store_healthy().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Matches of the calling student, newest first
///
/// GET /api/v1/matches
///
/// Response body:
/// ```json
/// {
///   "matches": [{"matchId": "uuid", "listingId": "string", "facultyId": "string", "createdAt": "rfc3339"}],
///   "totalResults": 1
/// }
/// ```
async fn list_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let user_id = &user.0.user_id;

    let matches: Vec<MatchSummary> = state
        .engine
        .query
        .list_matches(user_id)
        .await?
        .into_iter()
        .map(MatchSummary::for_student)
        .collect();

    tracing::debug!("Returning {} matches for user {}", matches.len(), user_id);

    Ok(HttpResponse::Ok().json(ListMatchesResponse {
        total_results: matches.len(),
        matches,
    }))
}

/// Matches on the calling faculty member's listings
///
/// GET /api/v1/matches/faculty
async fn list_faculty_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let matches: Vec<MatchSummary> = state
        .engine
        .query
        .list_faculty_matches(&user.0)
        .await?
        .into_iter()
        .map(MatchSummary::for_faculty)
        .collect();

    Ok(HttpResponse::Ok().json(ListMatchesResponse {
        total_results: matches.len(),
        matches,
    }))
}
