//! Scoring for the Blockparty events discovery engine.
//!
//! The crate provides the four pieces of the recommendation core:
//! - the **event embedder**, a deterministic mapping from event
//!   attributes to an 8-dimensional unit feature vector, driven by the
//!   constant weight tables in [`embedder`];
//! - the **taste aggregator**, a recency-decayed weighted average of
//!   the embeddings a user has interacted with;
//! - the **scoring engine**, which blends vibe overlap, distance,
//!   urgency, popularity, host trust, and taste similarity into one
//!   ranked feed with human-readable reasons;
//! - the **feedback updater**, which appends interactions and applies
//!   popularity and trust deltas through the store's atomic increments.
//!
//! # Examples
//!
//! ```no_run
//! use blockparty_core::SqliteStore;
//! use blockparty_scorer::{RecommendRequest, RecommendWeights, RecommendationEngine};
//! use geo::Coord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("blockparty.db")?;
//! let engine = RecommendationEngine::new(RecommendWeights::from_env()?)?;
//! let request = RecommendRequest::new("user-1", Coord { x: -79.38, y: 43.65 });
//! let feed = engine.recommend(&store, &request, chrono::Utc::now())?;
//! println!("{} events", feed.count);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod embedder;
mod engine;
mod error;
mod feedback;
pub mod taste;

pub use embedder::{EMBEDDER_VERSION, embed};
pub use engine::{
    DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_KM, MAX_RESULTS_CAP, RecommendRequest, RecommendWeights,
    RecommendationEngine, Recommendations, ScoreBreakdown, ScoredEvent,
};
pub use error::{FeedbackError, RecommendError};
pub use feedback::{TRUST_INCREMENT_RATE, apply_feedback, popularity_delta};
pub use taste::{TasteOptions, TasteSignal, aggregate_taste};
