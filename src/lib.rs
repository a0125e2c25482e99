//! Swipe Match - pairs students with faculty research listings
//!
//! Students swipe on listings; a right-swipe is scored by an external
//! compatibility scorer and becomes a durable match when the score clears the
//! configured threshold or the scorer recommends it. Swipes are unique per
//! (student, listing) and scoring failures leave the swipe pending for a
//! later retry instead of failing the request.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchQuery, MatchResolver, SwipeEngine, SwipeError, SwipeRecorder};
pub use crate::models::{Caller, CompatibilityScore, Match, MatchDecision, SwipeDirection, SwipeEvent, SwipeResult};
