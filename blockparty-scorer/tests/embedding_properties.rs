//! Property-based tests for the event embedder and cosine similarity.
//!
//! # Invariants tested
//!
//! - **Norm discipline:** every embedding is either exactly zero or unit
//!   L2-norm within floating tolerance.
//! - **Determinism:** embedding the same event twice is bit-identical.
//! - **Cosine bounds:** similarity stays inside `[-1, 1]`, is symmetric,
//!   and degenerate inputs yield exactly zero.

use blockparty_core::{AgeRestriction, Event, EventType, cosine_similarity};
use blockparty_scorer::embed;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

const VIBE_POOL: &[&str] = &[
    "Chill", "Wild", "Loud", "Zen", "Foodie", "Sweaty", "Cozy", "Artsy", "Boozy", "Unknownish",
];

const TYPE_POOL: &[EventType] = &[
    EventType::Party,
    EventType::Wellness,
    EventType::Food,
    EventType::Art,
    EventType::Sports,
    EventType::Networking,
    EventType::Music,
    EventType::Market,
    EventType::Outdoors,
    EventType::Other,
];

const AGE_POOL: &[Option<AgeRestriction>] = &[
    None,
    Some(AgeRestriction::AllAges),
    Some(AgeRestriction::NineteenPlus),
    Some(AgeRestriction::TwentyOnePlus),
];

fn arbitrary_event() -> impl Strategy<Value = Event> {
    (
        "[a-zA-Z][a-zA-Z ]{0,39}",
        "[a-zA-Z ]{0,120}",
        proptest::sample::subsequence(VIBE_POOL.to_vec(), 0..4),
        0..TYPE_POOL.len(),
        0_u32..24,
        proptest::option::of(1_u32..500),
        0..AGE_POOL.len(),
    )
        .prop_map(
            |(title, description, vibes, type_index, hour, capacity, age_index)| {
                let start = Utc
                    .with_ymd_and_hms(2026, 8, 7, hour, 0, 0)
                    .single()
                    .expect("valid timestamp");
                let mut event = Event::new(
                    "ev-prop",
                    title,
                    "host-1",
                    TYPE_POOL[type_index],
                    start,
                )
                .expect("valid event")
                .with_description(description)
                .expect("valid description")
                .with_vibes(vibes.into_iter().map(str::to_owned));
                if let Some(cap) = capacity {
                    event = event.with_capacity(cap);
                }
                if let Some(age) = AGE_POOL[age_index] {
                    event = event.with_age_restriction(age);
                }
                event
            },
        )
}

fn bounded_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-10.0_f32..10.0, 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: embeddings are unit-norm or exactly zero.
    #[test]
    fn embedding_norm_is_unit_or_zero(event in arbitrary_event()) {
        let embedding = embed(&event);
        if embedding.is_zero() {
            prop_assert!(embedding.as_slice().iter().all(|v| *v == 0.0));
        } else {
            prop_assert!(
                (embedding.norm() - 1.0).abs() < 1e-5,
                "norm was {}",
                embedding.norm()
            );
        }
    }

    /// Property: embedding is deterministic for an unchanged event.
    #[test]
    fn embedding_is_idempotent(event in arbitrary_event()) {
        prop_assert_eq!(embed(&event), embed(&event));
    }

    /// Property: cosine similarity is bounded and symmetric.
    #[test]
    fn cosine_is_bounded_and_symmetric(a in bounded_vector(), b in bounded_vector()) {
        let forward = cosine_similarity(&a, &b);
        let back = cosine_similarity(&b, &a);
        prop_assert!((-1.0..=1.0).contains(&forward));
        prop_assert!((forward - back).abs() < 1e-6);
    }

    /// Property: mismatched lengths always yield exactly zero.
    #[test]
    fn cosine_of_mismatched_lengths_is_zero(a in bounded_vector(), b in bounded_vector()) {
        prop_assume!(a.len() != b.len());
        prop_assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    /// Property: a nonzero embedding has similarity one with itself.
    #[test]
    fn nonzero_embedding_matches_itself(event in arbitrary_event()) {
        let embedding = embed(&event);
        prop_assume!(!embedding.is_zero());
        let similarity = cosine_similarity(embedding.as_slice(), embedding.as_slice());
        prop_assert!((similarity - 1.0).abs() < 1e-5);
    }
}
