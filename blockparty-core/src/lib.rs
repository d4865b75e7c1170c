//! Core domain types for the Blockparty events discovery engine.
//!
//! The crate owns the data model (events, users, interactions, RSVPs),
//! the fixed-width embedding vector with cosine similarity, the
//! haversine geo utility, the temporal bucketer, and the persistence
//! seam the scoring engine works against. Constructors validate early
//! and return `Result` so malformed input never reaches scoring.

#![forbid(unsafe_code)]

pub mod distance;
pub mod embedding;
pub mod event;
pub mod interaction;
pub mod store;
pub mod temporal;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use embedding::{Axis, EMBED_DIM, Embedding, cosine_similarity};
pub use event::{
    AgeRestriction, Event, EventError, EventLocation, EventType, MAX_DESCRIPTION_LEN,
    MAX_TITLE_LEN,
};
pub use interaction::{Interaction, InteractionAction, InteractionError, Rsvp, RsvpStatus};
pub use store::{EventStore, InteractionStore, StoreError, UserStore};
pub use temporal::{TimeBucket, TimeWindow, WhenFilter, bucket_start_time, time_window};
pub use user::{User, UserError};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteStore, SqliteStoreError};

#[cfg(any(test, feature = "test-support"))]
pub use test_support::MemoryStore;
