//! Behavioural coverage for the recommendation feed.

use std::cell::RefCell;

use blockparty_core::{
    Embedding, Event, EventLocation, EventType, MemoryStore, User,
};
use blockparty_scorer::{
    RecommendRequest, RecommendWeights, RecommendationEngine, Recommendations,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

fn evaluation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn downtown() -> Coord<f64> {
    Coord {
        x: -79.38,
        y: 43.65,
    }
}

fn sample_user() -> User {
    User::new("user-1", "Sam")
        .expect("valid user")
        .with_vibe_prefs(vec!["Chill".into(), "Foodie".into()])
}

fn event_at(id: &str, lat: f64, lng: f64) -> Event {
    Event::new(
        id,
        "Community picnic",
        "host-1",
        EventType::Outdoors,
        evaluation_time() + Duration::hours(1),
    )
    .expect("valid event")
    .with_location(EventLocation::from_lat_lng(lat, lng))
    .expect("valid location")
}

/// Shared store under test.
#[fixture]
fn store() -> RefCell<Option<MemoryStore>> {
    RefCell::new(None)
}

/// Captured feed for assertions.
#[fixture]
fn feed() -> RefCell<Option<Recommendations>> {
    RefCell::new(None)
}

#[given("a store with one close event and one distant event")]
fn close_and_distant(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let seeded = MemoryStore::with_events(vec![
        (event_at("close", 43.66, -79.38), Embedding::zero()),
        (event_at("distant", 44.5, -79.38), Embedding::zero()),
    ])
    .with_user(sample_user());
    *store.borrow_mut() = Some(seeded);
}

#[given("a store with sixty events of rising popularity")]
#[expect(
    clippy::cast_precision_loss,
    reason = "test indices are far below f32 precision limits"
)]
fn sixty_events(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let mut entries = Vec::new();
    for index in 0..60 {
        let mut event = event_at(&format!("ev-{index}"), 43.66, -79.38);
        event.popularity_score = index as f32;
        entries.push((event, Embedding::zero()));
    }
    let seeded = MemoryStore::with_events(entries).with_user(sample_user());
    *store.borrow_mut() = Some(seeded);
}

#[given("a store with an event matching two of the user's vibes")]
fn vibe_matching_event(#[from(store)] store: &RefCell<Option<MemoryStore>>) {
    let event =
        event_at("ev-1", 43.66, -79.38).with_vibes(vec!["Chill".into(), "Foodie".into()]);
    let seeded =
        MemoryStore::with_events(vec![(event, Embedding::zero())]).with_user(sample_user());
    *store.borrow_mut() = Some(seeded);
}

fn run_request(
    store: &RefCell<Option<MemoryStore>>,
    feed: &RefCell<Option<Recommendations>>,
    max: usize,
) {
    let engine =
        RecommendationEngine::new(RecommendWeights::default()).expect("valid default weights");
    let mut request = RecommendRequest::new("user-1", downtown());
    request.max = max;
    let borrowed = store.borrow();
    let seeded = borrowed.as_ref().expect("store must be seeded");
    let result = engine
        .recommend(seeded, &request, evaluation_time())
        .expect("recommendation succeeds");
    *feed.borrow_mut() = Some(result);
}

#[when("I request recommendations around downtown")]
fn request_default(
    #[from(store)] store: &RefCell<Option<MemoryStore>>,
    #[from(feed)] feed: &RefCell<Option<Recommendations>>,
) {
    run_request(store, feed, 20);
}

#[when("I request up to one hundred recommendations")]
fn request_hundred(
    #[from(store)] store: &RefCell<Option<MemoryStore>>,
    #[from(feed)] feed: &RefCell<Option<Recommendations>>,
) {
    run_request(store, feed, 100);
}

#[then("only the close event is returned")]
fn only_close(#[from(feed)] feed: &RefCell<Option<Recommendations>>) {
    let borrowed = feed.borrow();
    let result = borrowed.as_ref().expect("feed must be computed");
    let ids: Vec<_> = result.events.iter().map(|e| e.event.id.as_str()).collect();
    assert_eq!(ids, vec!["close"]);
}

#[then("fifty events are returned in descending score order")]
fn fifty_sorted(#[from(feed)] feed: &RefCell<Option<Recommendations>>) {
    let borrowed = feed.borrow();
    let result = borrowed.as_ref().expect("feed must be computed");
    assert_eq!(result.count, 50);
    let scores: Vec<f32> = result.events.iter().map(|e| e.score).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[then("the top event's reasons mention the vibe match")]
fn reasons_mention_vibes(#[from(feed)] feed: &RefCell<Option<Recommendations>>) {
    let borrowed = feed.borrow();
    let result = borrowed.as_ref().expect("feed must be computed");
    let top = result.events.first().expect("one event scored");
    assert!(
        top.reasons
            .iter()
            .any(|reason| reason.contains("of your vibes")),
        "reasons were {:?}",
        top.reasons
    );
}

#[scenario(path = "tests/features/recommendation.feature", index = 0)]
fn radius_excludes_distant(
    store: RefCell<Option<MemoryStore>>,
    feed: RefCell<Option<Recommendations>>,
) {
    let _ = (store, feed);
}

#[scenario(path = "tests/features/recommendation.feature", index = 1)]
fn capped_and_ranked(
    store: RefCell<Option<MemoryStore>>,
    feed: RefCell<Option<Recommendations>>,
) {
    let _ = (store, feed);
}

#[scenario(path = "tests/features/recommendation.feature", index = 2)]
fn vibe_overlap_explained(
    store: RefCell<Option<MemoryStore>>,
    feed: RefCell<Option<Recommendations>>,
) {
    let _ = (store, feed);
}
