use std::sync::Arc;
use uuid::Uuid;
use crate::core::error::SwipeError;
use crate::models::{Listing, Match, MatchDecision, ReconcileReport, ScoreState, SwipeEvent};
use crate::services::{
    CompatibilityScorer, ListingStore, ProfileSource, ScoreOutcome, ScoreWrite, SwipeStore,
};

/// Minimum compatibility score that creates a match without a recommendation
pub const DEFAULT_MATCH_THRESHOLD: f64 = 70.0;

/// Decides whether a right-swipe becomes a match
///
/// The only transition it performs is `Pending -> Scored`. Swipes already
/// scored are answered from stored state, which makes resolution safe to
/// retry any number of times.
#[derive(Clone)]
pub struct MatchResolver {
    store: Arc<dyn SwipeStore>,
    listings: Arc<dyn ListingStore>,
    profiles: Arc<dyn ProfileSource>,
    scorer: Arc<dyn CompatibilityScorer>,
    threshold: f64,
}

impl MatchResolver {
    pub fn new(
        store: Arc<dyn SwipeStore>,
        listings: Arc<dyn ListingStore>,
        profiles: Arc<dyn ProfileSource>,
        scorer: Arc<dyn CompatibilityScorer>,
        threshold: f64,
    ) -> Self {
        Self {
            store,
            listings,
            profiles,
            scorer,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve the swipe `swipe_id` made by `student_id` on `listing_id`
    pub async fn resolve_match(
        &self,
        student_id: &str,
        listing_id: &str,
        swipe_id: Uuid,
    ) -> Result<MatchDecision, SwipeError> {
        let swipe = self
            .store
            .get_swipe(swipe_id)
            .await?
            .filter(|s| s.user_id == student_id && s.listing_id == listing_id)
            .ok_or(SwipeError::SwipeNotFound(swipe_id))?;

        match swipe.score_state {
            ScoreState::NotApplicable => Ok(MatchDecision::not_applicable()),
            ScoreState::Scored { .. } => self.stored_decision(&swipe).await,
            ScoreState::Pending => {
                let listing = self
                    .listings
                    .get_listing(listing_id)
                    .await
                    .map_err(|e| SwipeError::from_listing_lookup(e, listing_id))?;
                self.resolve_pending(&swipe, &listing).await
            }
        }
    }

    /// Score a pending swipe against an already fetched listing
    pub(crate) async fn resolve_pending(
        &self,
        swipe: &SwipeEvent,
        listing: &Listing,
    ) -> Result<MatchDecision, SwipeError> {
        let profile_text = self
            .profiles
            .get_profile_text(&swipe.user_id)
            .await
            .map_err(SwipeError::Catalog)?;

        let outcome = self
            .scorer
            .score_compatibility(&profile_text, &listing.listing_text())
            .await;

        let score = match outcome {
            ScoreOutcome::Scored(raw) => match raw.normalized() {
                Some(score) => score,
                None => {
                    tracing::warn!("Scorer returned non-finite score for swipe {}", swipe.id);
                    return Ok(MatchDecision::deferred());
                }
            },
            ScoreOutcome::Unavailable(reason) => {
                tracing::warn!(
                    "Scoring deferred for swipe {} ({} -> {}): {}",
                    swipe.id,
                    swipe.user_id,
                    swipe.listing_id,
                    reason
                );
                return Ok(MatchDecision::deferred());
            }
        };

        let new_match = score
            .qualifies(self.threshold)
            .then(|| Match::for_swipe(swipe, &listing.faculty_id));

        match self.store.record_score(swipe.id, score.score, new_match).await? {
            ScoreWrite::Applied(persisted) => {
                tracing::info!(
                    "Resolved swipe {} with score {:.2}: {}",
                    swipe.id,
                    score.score,
                    if persisted.is_some() { "matched" } else { "no match" }
                );
                Ok(MatchDecision::scored(score.score, persisted.as_ref()))
            }
            ScoreWrite::AlreadyScored => {
                tracing::debug!("Swipe {} was scored concurrently", swipe.id);
                let current = self
                    .store
                    .get_swipe(swipe.id)
                    .await?
                    .ok_or(SwipeError::SwipeNotFound(swipe.id))?;
                self.stored_decision(&current).await
            }
        }
    }

    async fn stored_decision(&self, swipe: &SwipeEvent) -> Result<MatchDecision, SwipeError> {
        match swipe.score_state {
            ScoreState::Scored { score, matched: true } => {
                let existing = self
                    .store
                    .find_match(&swipe.user_id, &swipe.listing_id)
                    .await?;
                Ok(MatchDecision::scored(score, existing.as_ref()))
            }
            ScoreState::Scored { score, matched: false } => Ok(MatchDecision::scored(score, None)),
            ScoreState::Pending => Ok(MatchDecision::deferred()),
            ScoreState::NotApplicable => Ok(MatchDecision::not_applicable()),
        }
    }

    /// Retry up to `batch_size` pending swipes, least recently attempted first
    ///
    /// Each examined swipe is marked as attempted before it is retried, so
    /// swipes that keep failing rotate to the back instead of blocking the batch.
    pub async fn reconcile_pending(&self, batch_size: usize) -> Result<ReconcileReport, SwipeError> {
        let pending = self.store.list_pending(batch_size).await?;
        let mut report = ReconcileReport::default();

        for swipe in pending {
            report.examined += 1;
            self.store.mark_attempted(swipe.id).await?;
            match self
                .resolve_match(&swipe.user_id, &swipe.listing_id, swipe.id)
                .await
            {
                Ok(decision) if decision.deferred => report.still_pending += 1,
                Ok(decision) if decision.is_match => report.matched += 1,
                Ok(_) => report.scored_no_match += 1,
                Err(e) => {
                    tracing::warn!("Failed to reconcile swipe {}: {}", swipe.id, e);
                    report.failed += 1;
                }
            }
        }

        if report.examined > 0 {
            tracing::info!(
                "Reconciled {} pending swipes: {} matched, {} no match, {} still pending, {} failed",
                report.examined,
                report.matched,
                report.scored_no_match,
                report.still_pending,
                report.failed
            );
        }

        Ok(report)
    }
}
