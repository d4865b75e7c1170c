//! Apply interaction feedback to popularity and trust counters.
//!
//! Fire-and-forget: the interaction append and the counter increments
//! share no transaction, so a crash between them leaves an acknowledged
//! minor inconsistency rather than corrupt state. Counter mutation goes
//! through the store's atomic increments.

use blockparty_core::{
    EventStore, Interaction, InteractionAction, InteractionStore, StoreError, UserStore,
};
use chrono::{DateTime, Utc};
use log::debug;

use crate::error::FeedbackError;

/// Fraction of a positive popularity delta that accrues to host trust.
pub const TRUST_INCREMENT_RATE: f32 = 0.05;

/// Popularity delta applied per action.
///
/// Hides push popularity down; host trust only ever moves up, and only
/// for positive-signal actions.
#[must_use]
pub const fn popularity_delta(action: InteractionAction) -> f32 {
    match action {
        InteractionAction::View => 0.1,
        InteractionAction::Cosign => 0.6,
        InteractionAction::Going => 1.0,
        InteractionAction::Hide => -0.8,
    }
}

/// Record one interaction and apply its popularity and trust deltas.
///
/// Both the user and the event must exist; a missing reference is a
/// reportable error, not a silent no-op. A host whose user record has
/// vanished skips the trust increment (scoring falls back to the event's
/// own trust field), but any other store failure propagates.
///
/// # Errors
/// Returns [`FeedbackError::UserNotFound`] or
/// [`FeedbackError::EventNotFound`] for dangling references, and
/// propagates store failures uncategorised.
#[expect(
    clippy::float_arithmetic,
    reason = "trust increment scales the positive popularity delta"
)]
pub fn apply_feedback<S>(
    store: &S,
    user_id: &str,
    event_id: &str,
    action: InteractionAction,
    dwell_ms: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Interaction, FeedbackError>
where
    S: EventStore + UserStore + InteractionStore,
{
    store
        .user(user_id)?
        .ok_or_else(|| FeedbackError::UserNotFound {
            id: user_id.to_owned(),
        })?;
    let event = store
        .event(event_id)?
        .ok_or_else(|| FeedbackError::EventNotFound {
            id: event_id.to_owned(),
        })?;

    let interaction = Interaction::new(user_id, event_id, action, dwell_ms, now)?;
    store.record_interaction(&interaction)?;

    let delta = popularity_delta(action);
    if delta != 0.0 {
        store.add_popularity(event_id, delta)?;
    }

    if action.is_positive() {
        let trust_delta = delta.max(0.0) * TRUST_INCREMENT_RATE;
        match store.raise_host_trust(&event.host_id, trust_delta) {
            Ok(()) => {}
            Err(StoreError::UserNotFound { id }) => {
                debug!("host {id} missing; trust increment skipped");
            }
            Err(err) => return Err(err.into()),
        }
    }

    debug!("applied {action} from {user_id} to {event_id}");
    Ok(interaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockparty_core::{
        Embedding, Event, EventLocation, EventType, MemoryStore, User,
    };
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn seeded_store() -> MemoryStore {
        let event = Event::new("ev-1", "Potluck", "host-1", EventType::Food, now())
            .expect("valid event")
            .with_location(EventLocation::from_lat_lng(43.65, -79.38))
            .expect("valid location");
        MemoryStore::with_events(vec![(event, Embedding::zero())])
            .with_user(User::new("user-1", "Sam").expect("valid user"))
            .with_user(
                User::new("host-1", "Pat")
                    .expect("valid user")
                    .with_trust_score(0.5),
            )
    }

    #[fixture]
    fn store() -> MemoryStore {
        seeded_store()
    }

    fn popularity(store: &MemoryStore) -> f32 {
        store
            .event("ev-1")
            .expect("query event")
            .expect("event present")
            .popularity_score
    }

    fn host_trust(store: &MemoryStore) -> f32 {
        store
            .user("host-1")
            .expect("query host")
            .expect("host present")
            .trust_score
    }

    #[rstest]
    fn going_bumps_popularity_and_host_trust(store: MemoryStore) {
        apply_feedback(&store, "user-1", "ev-1", InteractionAction::Going, None, now())
            .expect("feedback applies");
        assert!((popularity(&store) - 1.0).abs() < 1e-6);
        assert!((host_trust(&store) - 0.55).abs() < 1e-6);
    }

    #[rstest]
    fn hide_drops_popularity_but_leaves_trust(store: MemoryStore) {
        apply_feedback(&store, "user-1", "ev-1", InteractionAction::Hide, None, now())
            .expect("feedback applies");
        assert!((popularity(&store) + 0.8).abs() < 1e-6);
        assert!((host_trust(&store) - 0.5).abs() < 1e-6);
    }

    #[rstest]
    fn cosign_applies_scaled_trust_increment(store: MemoryStore) {
        apply_feedback(&store, "user-1", "ev-1", InteractionAction::Cosign, None, now())
            .expect("feedback applies");
        assert!((popularity(&store) - 0.6).abs() < 1e-6);
        assert!((host_trust(&store) - 0.53).abs() < 1e-6);
    }

    #[rstest]
    fn view_records_dwell_time(store: MemoryStore) {
        let interaction = apply_feedback(
            &store,
            "user-1",
            "ev-1",
            InteractionAction::View,
            Some(42_000),
            now(),
        )
        .expect("feedback applies");
        assert_eq!(interaction.dwell_ms, Some(42_000));
        let log = store.interactions_for("user-1").expect("query log");
        assert_eq!(log.len(), 1);
    }

    #[rstest]
    fn unknown_user_is_reported(store: MemoryStore) {
        let err = apply_feedback(&store, "ghost", "ev-1", InteractionAction::View, None, now())
            .expect_err("unknown user");
        assert!(matches!(err, FeedbackError::UserNotFound { id } if id == "ghost"));
    }

    #[rstest]
    fn unknown_event_is_reported(store: MemoryStore) {
        let err = apply_feedback(&store, "user-1", "ghost", InteractionAction::View, None, now())
            .expect_err("unknown event");
        assert!(matches!(err, FeedbackError::EventNotFound { id } if id == "ghost"));
    }

    #[rstest]
    fn missing_host_skips_trust_but_still_counts(store: MemoryStore) {
        let orphan = Event::new("ev-2", "Mystery rave", "gone-host", EventType::Party, now())
            .expect("valid event");
        store
            .upsert_event(&orphan, &Embedding::zero())
            .expect("upsert event");

        apply_feedback(&store, "user-1", "ev-2", InteractionAction::Going, None, now())
            .expect("feedback applies despite missing host");
        let event = store
            .event("ev-2")
            .expect("query event")
            .expect("event present");
        assert!((event.popularity_score - 1.0).abs() < 1e-6);
    }

    #[rstest]
    fn repeated_feedback_accumulates(store: MemoryStore) {
        for _ in 0..3 {
            apply_feedback(&store, "user-1", "ev-1", InteractionAction::View, None, now())
                .expect("feedback applies");
        }
        assert!((popularity(&store) - 0.3).abs() < 1e-5);
        assert_eq!(store.interactions_for("user-1").expect("log").len(), 3);
    }
}
