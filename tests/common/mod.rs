// Shared fakes for the external collaborators of the swipe engine

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swipe_match::core::SwipeEngine;
use swipe_match::models::{CompatibilityScore, Listing};
use swipe_match::services::{
    CatalogError, CompatibilityScorer, InMemorySwipeStore, ListingStore, ProfileSource,
    ScoreOutcome,
};

pub fn listing(id: &str, faculty_id: &str, active: bool) -> Listing {
    Listing {
        id: id.to_string(),
        faculty_id: faculty_id.to_string(),
        title: format!("Research project {}", id),
        description: "Lab work on protein structures".to_string(),
        requirements: "Python, statistics".to_string(),
        active,
    }
}

/// Listing store backed by a fixed set of listings
pub struct StaticListings {
    listings: HashMap<String, Listing>,
}

impl StaticListings {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: listings.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }
}

#[async_trait]
impl ListingStore for StaticListings {
    async fn get_listing(&self, listing_id: &str) -> Result<Listing, CatalogError> {
        self.listings
            .get(listing_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("listings {}", listing_id)))
    }
}

/// Profile source returning the same text for every user except `missing`
pub struct StaticProfiles {
    missing: Vec<String>,
}

impl StaticProfiles {
    pub fn new() -> Self {
        Self { missing: vec![] }
    }

    pub fn without(users: &[&str]) -> Self {
        Self {
            missing: users.iter().map(|u| u.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ProfileSource for StaticProfiles {
    async fn get_profile_text(&self, user_id: &str) -> Result<String, CatalogError> {
        if self.missing.iter().any(|u| u == user_id) {
            return Err(CatalogError::NotFound(format!("users {}", user_id)));
        }
        Ok(format!("Profile of {}: biology major, Python", user_id))
    }
}

/// Scorer that replays queued outcomes, then repeats a fallback
pub struct ScriptedScorer {
    queue: Mutex<VecDeque<ScoreOutcome>>,
    fallback: ScoreOutcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn always(outcome: ScoreOutcome) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: outcome,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn sequence(outcomes: Vec<ScoreOutcome>, fallback: ScoreOutcome) -> Self {
        Self {
            queue: Mutex::new(outcomes.into()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompatibilityScorer for ScriptedScorer {
    async fn score_compatibility(&self, _profile_text: &str, _listing_text: &str) -> ScoreOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn scored(score: f64, recommend: bool) -> ScoreOutcome {
    ScoreOutcome::Scored(CompatibilityScore { score, recommend })
}

pub fn unavailable() -> ScoreOutcome {
    ScoreOutcome::Unavailable("timed out after 3s".to_string())
}

/// Everything a test needs to drive and inspect an engine
pub struct Harness {
    pub engine: SwipeEngine,
    pub store: Arc<InMemorySwipeStore>,
    pub scorer: Arc<ScriptedScorer>,
}

pub fn harness_with(scorer: ScriptedScorer, profiles: StaticProfiles) -> Harness {
    let store = Arc::new(InMemorySwipeStore::new());
    let scorer = Arc::new(scorer);
    let listings = Arc::new(StaticListings::new(vec![
        listing("L1", "F1", true),
        listing("L2", "F1", true),
        listing("L3", "F2", true),
        listing("L-closed", "F2", false),
    ]));

    let engine = SwipeEngine::new(
        store.clone(),
        listings,
        Arc::new(profiles),
        scorer.clone(),
        70.0,
    );

    Harness { engine, store, scorer }
}

pub fn harness(scorer: ScriptedScorer) -> Harness {
    harness_with(scorer, StaticProfiles::new())
}
