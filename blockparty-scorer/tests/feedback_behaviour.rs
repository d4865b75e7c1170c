//! Behavioural coverage for applying interaction feedback.

use std::cell::RefCell;

use blockparty_core::{
    Embedding, Event, EventLocation, EventStore, EventType, InteractionAction, MemoryStore, User,
    UserStore,
};
use blockparty_scorer::apply_feedback;
use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

fn evaluation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Shared store under test.
#[fixture]
fn store() -> RefCell<Option<MemoryStore>> {
    RefCell::new(None)
}

fn seeded_store() -> MemoryStore {
    let event = Event::new(
        "ev-1",
        "Potluck",
        "host-1",
        EventType::Food,
        evaluation_time(),
    )
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

#[given("a stored event with a known host")]
fn stored_event(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    *store.borrow_mut() = Some(seeded_store());
}

fn apply(store: &RefCell<Option<MemoryStore>>, action: InteractionAction) {
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    apply_feedback(seeded, "user-1", "ev-1", action, None, evaluation_time())
        .expect("feedback applies");
}

#[when("the user marks themselves as going")]
fn user_goes(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    apply(store, InteractionAction::Going);
}

#[when("the user hides the event")]
fn user_hides(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    apply(store, InteractionAction::Hide);
}

#[then("popularity rises by one point")]
fn popularity_up_one(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    assert!((popularity(seeded) - 1.0).abs() < 1e-6);
}

#[then("host trust rises by five hundredths")]
fn trust_up(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    assert!((host_trust(seeded) - 0.55).abs() < 1e-6);
}

#[then("popularity falls by eight tenths")]
fn popularity_down(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    assert!((popularity(seeded) + 0.8).abs() < 1e-6);
}

#[then("host trust is unchanged")]
fn trust_unchanged(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    assert!((host_trust(seeded) - 0.5).abs() < 1e-6);
}

#[scenario(path = "tests/features/feedback.feature", index = 0)]
fn going_feeds_popularity_and_trust(store: RefCell<Option<MemoryStore>>) {
    let _ = store;
}

#[scenario(path = "tests/features/feedback.feature", index = 1)]
fn hide_leaves_trust_alone(store: RefCell<Option<MemoryStore>>) {
    let _ = store;
}
