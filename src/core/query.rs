use std::sync::Arc;
use crate::core::error::SwipeError;
use crate::models::{Caller, Match, Role, SwipeEvent};
use crate::services::SwipeStore;

/// Read-only lookups over persisted swipes and matches
#[derive(Clone)]
pub struct MatchQuery {
    store: Arc<dyn SwipeStore>,
}

impl MatchQuery {
    pub fn new(store: Arc<dyn SwipeStore>) -> Self {
        Self { store }
    }

    /// Matches where `user_id` is the student, newest first
    pub async fn list_matches(&self, user_id: &str) -> Result<Vec<Match>, SwipeError> {
        Ok(self.store.list_matches_for_student(user_id).await?)
    }

    pub async fn get_swipe_status(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> Result<SwipeEvent, SwipeError> {
        self.store
            .find_swipe(user_id, listing_id)
            .await?
            .ok_or_else(|| SwipeError::SwipeStatusNotFound(listing_id.to_string()))
    }

    /// Swipe history of `user_id`, newest first
    pub async fn list_swipes(&self, user_id: &str) -> Result<Vec<SwipeEvent>, SwipeError> {
        Ok(self.store.list_swipes(user_id).await?)
    }

    /// Matches on listings owned by the calling faculty member
    pub async fn list_faculty_matches(&self, caller: &Caller) -> Result<Vec<Match>, SwipeError> {
        if caller.role != Role::Faculty {
            return Err(SwipeError::Unauthorized("faculty"));
        }
        Ok(self.store.list_matches_for_faculty(&caller.user_id).await?)
    }

    pub async fn store_healthy(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Store health check failed: {}", e);
                false
            }
        }
    }
}
