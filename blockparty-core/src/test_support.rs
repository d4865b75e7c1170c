//! Test-only, in-memory store implementation used by unit and behaviour
//! tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use geo::Coord;

use crate::{
    Embedding, Event, EventStore, Interaction, InteractionStore, Rsvp, RsvpStatus, StoreError,
    TimeWindow, User, UserStore, haversine_km,
};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    embeddings: HashMap<String, Embedding>,
    users: HashMap<String, User>,
    interactions: Vec<Interaction>,
    rsvps: HashMap<(String, String), RsvpStatus>,
}

/// In-memory store used in tests.
///
/// Performs linear scans and is intended only for small datasets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store containing the given events with their embeddings.
    #[must_use]
    pub fn with_events<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Event, Embedding)>,
    {
        let mut inner = Inner::default();
        for (event, embedding) in entries {
            inner.embeddings.insert(event.id.clone(), embedding);
            inner.events.push(event);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Add a user while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        {
            let mut inner = self.lock();
            inner.users.insert(user.id.clone(), user);
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl EventStore for MemoryStore {
    fn event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.lock().events.iter().find(|e| e.id == id).cloned())
    }

    fn events_near(
        &self,
        center: Coord<f64>,
        radius_km: f64,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|event| {
                haversine_km(event.location.coord, Some(center))
                    .is_some_and(|km| km <= radius_km)
            })
            .filter(|event| window.is_none_or(|w| w.contains(event.start_time)))
            .cloned()
            .collect())
    }

    fn events_in_window(&self, window: &TimeWindow) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|event| window.contains(event.start_time))
            .cloned()
            .collect())
    }

    fn upsert_event(&self, event: &Event, embedding: &Embedding) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.events.retain(|e| e.id != event.id);
        inner.events.push(event.clone());
        inner.embeddings.insert(event.id.clone(), *embedding);
        Ok(())
    }

    fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let before = inner.events.len();
        inner.events.retain(|e| e.id != id);
        if inner.events.len() == before {
            return Err(StoreError::EventNotFound { id: id.to_owned() });
        }
        inner.embeddings.remove(id);
        Ok(())
    }

    fn embedding(&self, event_id: &str) -> Result<Option<Embedding>, StoreError> {
        Ok(self.lock().embeddings.get(event_id).copied())
    }
}

impl UserStore for MemoryStore {
    fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.lock().users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn save_taste_vector(&self, user_id: &str, taste: &[f32]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound {
                id: user_id.to_owned(),
            })?;
        user.taste_vector = taste.to_vec();
        Ok(())
    }
}

impl InteractionStore for MemoryStore {
    fn record_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        self.lock().interactions.push(interaction.clone());
        Ok(())
    }

    fn interactions_for(&self, user_id: &str) -> Result<Vec<Interaction>, StoreError> {
        Ok(self
            .lock()
            .interactions
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "popularity mutation is an additive counter"
    )]
    fn add_popularity(&self, event_id: &str, delta: f32) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let event = inner
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| StoreError::EventNotFound {
                id: event_id.to_owned(),
            })?;
        event.popularity_score += delta;
        Ok(())
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "trust mutation is an additive counter clamped to one"
    )]
    fn raise_host_trust(&self, host_id: &str, delta: f32) -> Result<(), StoreError> {
        if delta <= 0.0 {
            return Ok(());
        }
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(host_id)
            .ok_or_else(|| StoreError::UserNotFound {
                id: host_id.to_owned(),
            })?;
        user.trust_score = (user.trust_score + delta).min(1.0);
        Ok(())
    }

    fn rsvp_count(&self, event_id: &str) -> Result<u64, StoreError> {
        let count = self
            .lock()
            .rsvps
            .keys()
            .filter(|(_, event)| event == event_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn upsert_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        self.lock().rsvps.insert(
            (rsvp.user_id.clone(), rsvp.event_id.clone()),
            rsvp.status,
        );
        Ok(())
    }

    fn cancel_rsvp(&self, user_id: &str, event_id: &str) -> Result<(), StoreError> {
        self.lock()
            .rsvps
            .remove(&(user_id.to_owned(), event_id.to_owned()));
        Ok(())
    }
}
