use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::models::{Match, ScoreState, SwipeEvent};
use crate::services::store::{ScoreWrite, StoreError, SwipeStore};

type PairKey = (String, String);

#[derive(Default)]
struct MemoryState {
    swipes: HashMap<Uuid, SwipeEvent>,
    swipe_keys: HashMap<PairKey, Uuid>,
    matches: HashMap<PairKey, Match>,
    // Sequence number of the latest reconciliation attempt per swipe
    attempts: HashMap<Uuid, u64>,
    attempt_seq: u64,
}

/// Swipe store held in process memory
///
/// Every write takes the state lock for its whole check-and-set, which gives
/// the same uniqueness guarantees the database constraints give. Used for
/// tests, benchmarks and `database.url = "memory"` runs.
#[derive(Default)]
pub struct InMemorySwipeStore {
    state: RwLock<MemoryState>,
}

impl InMemorySwipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn swipe_count(&self) -> usize {
        self.state.read().await.swipes.len()
    }

    pub async fn match_count(&self) -> usize {
        self.state.read().await.matches.len()
    }
}

fn pair(a: &str, b: &str) -> PairKey {
    (a.to_string(), b.to_string())
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl SwipeStore for InMemorySwipeStore {
    async fn insert_swipe(&self, swipe: &SwipeEvent) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let key = pair(&swipe.user_id, &swipe.listing_id);

        if state.swipe_keys.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "swipe ({}, {})",
                swipe.user_id, swipe.listing_id
            )));
        }

        state.swipe_keys.insert(key, swipe.id);
        state.swipes.insert(swipe.id, swipe.clone());
        Ok(())
    }

    async fn get_swipe(&self, swipe_id: Uuid) -> Result<Option<SwipeEvent>, StoreError> {
        Ok(self.state.read().await.swipes.get(&swipe_id).cloned())
    }

    async fn find_swipe(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> Result<Option<SwipeEvent>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .swipe_keys
            .get(&pair(user_id, listing_id))
            .and_then(|id| state.swipes.get(id))
            .cloned())
    }

    async fn list_swipes(&self, user_id: &str) -> Result<Vec<SwipeEvent>, StoreError> {
        let state = self.state.read().await;
        let mut swipes: Vec<SwipeEvent> = state
            .swipes
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut swipes, |s| (s.created_at, s.id));
        Ok(swipes)
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<SwipeEvent>, StoreError> {
        let state = self.state.read().await;
        let mut pending: Vec<SwipeEvent> = state
            .swipes
            .values()
            .filter(|s| s.score_state.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|s| (state.attempts.get(&s.id).copied(), s.created_at, s.id));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_attempted(&self, swipe_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if !state.swipes.contains_key(&swipe_id) {
            return Err(StoreError::NotFound(format!("swipe {}", swipe_id)));
        }

        state.attempt_seq += 1;
        let seq = state.attempt_seq;
        state.attempts.insert(swipe_id, seq);
        Ok(())
    }

    async fn record_score(
        &self,
        swipe_id: Uuid,
        score: f64,
        new_match: Option<Match>,
    ) -> Result<ScoreWrite, StoreError> {
        let mut state = self.state.write().await;

        let swipe = state
            .swipes
            .get(&swipe_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("swipe {}", swipe_id)))?;

        if !swipe.score_state.is_pending() {
            return Ok(ScoreWrite::AlreadyScored);
        }

        let persisted = new_match.map(|m| {
            state
                .matches
                .entry(pair(&m.student_id, &m.listing_id))
                .or_insert(m)
                .clone()
        });

        if let Some(stored) = state.swipes.get_mut(&swipe_id) {
            stored.score_state = ScoreState::Scored {
                score,
                matched: persisted.is_some(),
            };
        }

        Ok(ScoreWrite::Applied(persisted))
    }

    async fn find_match(
        &self,
        student_id: &str,
        listing_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .matches
            .get(&pair(student_id, listing_id))
            .cloned())
    }

    async fn list_matches_for_student(&self, student_id: &str) -> Result<Vec<Match>, StoreError> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.student_id == student_id)
            .cloned()
            .collect();
        newest_first(&mut matches, |m| (m.created_at, m.id));
        Ok(matches)
    }

    async fn list_matches_for_faculty(&self, faculty_id: &str) -> Result<Vec<Match>, StoreError> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.faculty_id == faculty_id)
            .cloned()
            .collect();
        newest_first(&mut matches, |m| (m.created_at, m.id));
        Ok(matches)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
