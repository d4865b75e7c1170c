//! Data access traits for events, users, interactions, and RSVPs.
//!
//! The traits define the persistence seam the scoring engine and the
//! feedback updater work against. Counter mutation is expressed as
//! atomic deltas (`add_popularity`, `raise_host_trust`) rather than
//! read-modify-write so concurrent feedback cannot lose updates.

use geo::Coord;
use thiserror::Error;

use crate::{Embedding, Event, Interaction, Rsvp, TimeWindow, User};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStore, SqliteStoreError};

/// Errors surfaced by store implementations.
///
/// Not-found conditions are distinct variants so callers can map them to
/// user-facing errors; everything else is an uncategorised backend
/// failure tagged with the operation that raised it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced user does not exist.
    #[error("user {id} not found")]
    UserNotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The referenced event does not exist.
    #[error("event {id} not found")]
    EventNotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// A persisted payload could not be decoded.
    #[error("failed to decode {entity} for {id}")]
    Decode {
        /// Kind of payload that failed, e.g. "embedding".
        entity: &'static str,
        /// Identifier of the owning row.
        id: String,
        /// Underlying decoding failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The storage backend failed.
    #[error("storage failure during {operation}")]
    Backend {
        /// Description of the failed operation.
        operation: &'static str,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Read and write access to persisted events and their embeddings.
///
/// Embeddings are derived data: `upsert_event` requires the regenerated
/// embedding alongside the event so the two can never drift apart.
pub trait EventStore {
    /// Fetch one event by id.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure; a missing event is
    /// `Ok(None)`, not an error.
    fn event(&self, id: &str) -> Result<Option<Event>, StoreError>;

    /// Events with known coordinates within `radius_km` of `center`,
    /// optionally pre-filtered to a start-time window.
    ///
    /// Implementations may over-approximate the radius (e.g. a bounding
    /// box); callers apply the exact great-circle filter. Events without
    /// coordinates are never returned here.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn events_near(
        &self,
        center: Coord<f64>,
        radius_km: f64,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Events starting inside the window regardless of location,
    /// including events without coordinates.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn events_in_window(&self, window: &TimeWindow) -> Result<Vec<Event>, StoreError>;

    /// Insert or replace an event together with its freshly derived
    /// embedding.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn upsert_event(&self, event: &Event, embedding: &Embedding) -> Result<(), StoreError>;

    /// Delete an event and its derived rows.
    ///
    /// # Errors
    /// Returns [`StoreError::EventNotFound`] when no such event exists.
    fn delete_event(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch the stored embedding for an event, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend or decode failure; a missing
    /// embedding is `Ok(None)` and degrades scoring rather than failing
    /// it.
    fn embedding(&self, event_id: &str) -> Result<Option<Embedding>, StoreError>;
}

/// Read and write access to persisted users.
pub trait UserStore {
    /// Fetch one user by id.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure; a missing user is
    /// `Ok(None)`.
    fn user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert or replace a user.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn upsert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Persist a freshly aggregated taste vector for a user.
    ///
    /// # Errors
    /// Returns [`StoreError::UserNotFound`] when no such user exists.
    fn save_taste_vector(&self, user_id: &str, taste: &[f32]) -> Result<(), StoreError>;
}

/// Append-only interaction log plus the counters it drives.
pub trait InteractionStore {
    /// Append one interaction to the log.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn record_interaction(&self, interaction: &Interaction) -> Result<(), StoreError>;

    /// All interactions recorded for a user, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn interactions_for(&self, user_id: &str) -> Result<Vec<Interaction>, StoreError>;

    /// Atomically add a delta to an event's popularity score.
    ///
    /// # Errors
    /// Returns [`StoreError::EventNotFound`] when no such event exists.
    fn add_popularity(&self, event_id: &str, delta: f32) -> Result<(), StoreError>;

    /// Atomically raise a host's trust score, clamped to `1.0`.
    ///
    /// Trust only grows through feedback; negative deltas are a caller
    /// bug and are ignored.
    ///
    /// # Errors
    /// Returns [`StoreError::UserNotFound`] when no such user exists.
    fn raise_host_trust(&self, host_id: &str, delta: f32) -> Result<(), StoreError>;

    /// Number of RSVPs currently held against an event.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn rsvp_count(&self, event_id: &str) -> Result<u64, StoreError>;

    /// Insert or update the caller's RSVP for an event.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn upsert_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError>;

    /// Remove the caller's RSVP for an event, if present.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    fn cancel_rsvp(&self, user_id: &str, event_id: &str) -> Result<(), StoreError>;
}
