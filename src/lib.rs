//! Facade crate for the Blockparty events recommendation engine.
//!
//! This crate re-exports the core domain types and the scoring surface,
//! and exposes the optional SQLite store behind a feature flag.

#![forbid(unsafe_code)]

pub use blockparty_core::{
    AgeRestriction, Axis, EMBED_DIM, Embedding, Event, EventError, EventLocation, EventStore,
    EventType, Interaction, InteractionAction, InteractionError, InteractionStore, Rsvp,
    RsvpStatus, StoreError, TimeBucket, TimeWindow, User, UserError, UserStore, WhenFilter,
    bucket_start_time, cosine_similarity, haversine_km, time_window,
};

pub use blockparty_scorer::{
    FeedbackError, RecommendError, RecommendRequest, RecommendWeights, RecommendationEngine,
    Recommendations, ScoreBreakdown, ScoredEvent, TasteOptions, TasteSignal, aggregate_taste,
    apply_feedback, embed,
};

#[cfg(feature = "store-sqlite")]
pub use blockparty_core::{SqliteStore, SqliteStoreError};

#[cfg(feature = "test-support")]
pub use blockparty_core::MemoryStore;
