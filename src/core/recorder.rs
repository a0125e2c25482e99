use std::sync::Arc;
use crate::core::error::SwipeError;
use crate::core::resolver::MatchResolver;
use crate::models::{Caller, MatchDecision, Role, SwipeDirection, SwipeEvent, SwipeResult};
use crate::services::{ListingStore, StoreError, SwipeStore};

/// Records swipes, one per (user, listing)
///
/// # Steps
/// 1. Role and listing checks, before anything is written
/// 2. Atomic insert-if-absent of the swipe
/// 3. Right-swipes are handed to the resolver synchronously
#[derive(Clone)]
pub struct SwipeRecorder {
    store: Arc<dyn SwipeStore>,
    listings: Arc<dyn ListingStore>,
    resolver: MatchResolver,
}

impl SwipeRecorder {
    pub fn new(
        store: Arc<dyn SwipeStore>,
        listings: Arc<dyn ListingStore>,
        resolver: MatchResolver,
    ) -> Self {
        Self {
            store,
            listings,
            resolver,
        }
    }

    pub async fn record_swipe(
        &self,
        caller: &Caller,
        listing_id: &str,
        direction: SwipeDirection,
    ) -> Result<SwipeResult, SwipeError> {
        if caller.role != Role::Student {
            return Err(SwipeError::Unauthorized("student"));
        }

        let listing = self
            .listings
            .get_listing(listing_id)
            .await
            .map_err(|e| SwipeError::from_listing_lookup(e, listing_id))?;

        if !listing.active {
            return Err(SwipeError::ListingInactive(listing_id.to_string()));
        }

        let swipe = SwipeEvent::new(&caller.user_id, listing_id, direction);

        self.store
            .insert_swipe(&swipe)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => SwipeError::AlreadySwiped {
                    listing_id: listing_id.to_string(),
                },
                other => SwipeError::Store(other),
            })?;

        tracing::info!(
            "Recorded {} swipe {} by {} on {}",
            direction.as_str(),
            swipe.id,
            caller.user_id,
            listing_id
        );

        if direction == SwipeDirection::Passed {
            return Ok(SwipeResult::passed(&swipe));
        }

        // The swipe is persisted as pending; failures past this point only defer the decision
        let decision = match self.resolver.resolve_pending(&swipe, &listing).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("Swipe {} left pending: {}", swipe.id, e);
                MatchDecision::deferred()
            }
        };

        Ok(SwipeResult::from_decision(&swipe, &decision))
    }
}
