use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use uuid::Uuid;
use crate::models::ErrorResponse;
use crate::services::{CatalogError, StoreError};

/// Failures of the swipe-match operations
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("A swipe on listing {listing_id} already exists for this user")]
    AlreadySwiped { listing_id: String },

    #[error("Listing {0} not found")]
    ListingNotFound(String),

    #[error("Listing {0} is not active")]
    ListingInactive(String),

    #[error("Only {0} accounts may perform this action")]
    Unauthorized(&'static str),

    #[error("Swipe {0} not found")]
    SwipeNotFound(Uuid),

    #[error("No swipe on listing {0}")]
    SwipeStatusNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog error: {0}")]
    Catalog(CatalogError),
}

impl SwipeError {
    /// Short machine-readable code used in error bodies
    pub fn code(&self) -> &'static str {
        match self {
            SwipeError::AlreadySwiped { .. } => "already_swiped",
            SwipeError::ListingNotFound(_) => "listing_not_found",
            SwipeError::ListingInactive(_) => "listing_inactive",
            SwipeError::Unauthorized(_) => "unauthorized",
            SwipeError::SwipeNotFound(_) | SwipeError::SwipeStatusNotFound(_) => "not_found",
            SwipeError::Store(_) => "store_error",
            SwipeError::Catalog(_) => "catalog_error",
        }
    }

    /// Resolve a catalog failure for a specific listing
    pub fn from_listing_lookup(err: CatalogError, listing_id: &str) -> Self {
        match err {
            CatalogError::NotFound(_) => SwipeError::ListingNotFound(listing_id.to_string()),
            other => SwipeError::Catalog(other),
        }
    }
}

impl ResponseError for SwipeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SwipeError::AlreadySwiped { .. } => StatusCode::CONFLICT,
            SwipeError::ListingNotFound(_)
            | SwipeError::SwipeNotFound(_)
            | SwipeError::SwipeStatusNotFound(_) => StatusCode::NOT_FOUND,
            SwipeError::ListingInactive(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SwipeError::Unauthorized(_) => StatusCode::FORBIDDEN,
            SwipeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SwipeError::Catalog(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
