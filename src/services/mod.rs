// Service exports
pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod scorer;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, ListingStore, ProfileSource};
pub use memory::InMemorySwipeStore;
pub use postgres::PostgresClient;
pub use scorer::{CompatibilityScorer, HttpScorer, ScoreOutcome};
pub use store::{ScoreWrite, StoreError, SwipeStore};
