use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to record a swipe on a listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(alias = "listing_id", rename = "listingId")]
    pub listing_id: String,
    pub interested: bool,
}
