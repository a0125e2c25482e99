// Route exports
pub mod matches;
pub mod swipes;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use crate::core::SwipeEngine;
use crate::models::ErrorResponse;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: SwipeEngine,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(swipes::configure),
    );
}

/// JSON error response for malformed payloads
#[derive(Debug)]
pub struct PayloadError(ErrorResponse);

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl error::ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    PayloadError(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    PayloadError(ErrorResponse {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    })
    .into()
}
