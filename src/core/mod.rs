// Swipe-match engine exports
pub mod engine;
pub mod error;
pub mod query;
pub mod recorder;
pub mod resolver;

pub use engine::SwipeEngine;
pub use error::SwipeError;
pub use query::MatchQuery;
pub use recorder::SwipeRecorder;
pub use resolver::{MatchResolver, DEFAULT_MATCH_THRESHOLD};
