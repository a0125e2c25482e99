use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::auth::AuthenticatedUser;
use crate::core::SwipeError;
use crate::models::{
    ErrorResponse, ListSwipesResponse, RecordSwipeRequest, RecordSwipeResponse, SwipeDirection,
    SwipeStatusResponse,
};
use crate::routes::AppState;

/// Configure all swipe-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/swipes", web::post().to(record_swipe))
        .route("/swipes", web::get().to(list_swipes))
        .route("/swipes/{listing_id}", web::get().to(get_swipe_status));
}

/// Record swipe endpoint
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "listingId": "string",
///   "interested": true
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<RecordSwipeRequest>,
) -> Result<HttpResponse, SwipeError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for record_swipe request: {:?}", errors);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let AuthenticatedUser(caller) = user;
    let direction = SwipeDirection::from_interested(req.interested);

    let result = state
        .engine
        .recorder
        .record_swipe(&caller, &req.listing_id, direction)
        .await?;

    Ok(HttpResponse::Ok().json(RecordSwipeResponse::from(result)))
}

/// Swipe history of the caller
///
/// GET /api/v1/swipes
async fn list_swipes(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let swipes = state.engine.query.list_swipes(&user.0.user_id).await?;

    let swipes: Vec<SwipeStatusResponse> = swipes.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ListSwipesResponse {
        total_results: swipes.len(),
        swipes,
    }))
}

/// Swipe status of the caller on one listing
///
/// GET /api/v1/swipes/{listingId}
async fn get_swipe_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, SwipeError> {
    let listing_id = path.into_inner();

    let swipe = state
        .engine
        .query
        .get_swipe_status(&user.0.user_id, &listing_id)
        .await?;

    Ok(HttpResponse::Ok().json(SwipeStatusResponse::from(swipe)))
}
