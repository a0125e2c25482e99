use std::sync::Arc;
use crate::core::{MatchQuery, MatchResolver, SwipeRecorder};
use crate::services::{CompatibilityScorer, ListingStore, ProfileSource, SwipeStore};

/// The recorder, resolver and query API wired to one set of collaborators
#[derive(Clone)]
pub struct SwipeEngine {
    pub recorder: SwipeRecorder,
    pub resolver: MatchResolver,
    pub query: MatchQuery,
}

impl SwipeEngine {
    pub fn new(
        store: Arc<dyn SwipeStore>,
        listings: Arc<dyn ListingStore>,
        profiles: Arc<dyn ProfileSource>,
        scorer: Arc<dyn CompatibilityScorer>,
        threshold: f64,
    ) -> Self {
        let resolver = MatchResolver::new(
            store.clone(),
            listings.clone(),
            profiles,
            scorer,
            threshold,
        );
        let recorder = SwipeRecorder::new(store.clone(), listings, resolver.clone());
        let query = MatchQuery::new(store);

        Self {
            recorder,
            resolver,
            query,
        }
    }
}
