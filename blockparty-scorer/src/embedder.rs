//! Deterministic mapping from event attributes to an 8-dimensional
//! feature vector.
//!
//! The weight tables below are the embedder's configuration data: vibe
//! tags, event types, and keyword patterns each contribute partial
//! weights across the semantic axes, followed by time-of-day, capacity,
//! and age-restriction adjustments. The final accumulator is
//! L2-normalised, so two embeddings of the same unchanged event are
//! bit-identical.

use blockparty_core::{AgeRestriction, Axis, EMBED_DIM, Embedding, Event};
use chrono::Timelike;

/// Version of the weight tables; bump when any constant below changes so
/// persisted embeddings can be regenerated.
pub const EMBEDDER_VERSION: u32 = 1;

/// Event type is a stronger signal than a single vibe tag.
const EVENT_TYPE_MULTIPLIER: f32 = 1.2;

/// Nightlife boost for events starting between 18:00 and 02:00.
const NIGHT_START_BOOST: f32 = 0.5;
/// Wellness boost for events starting between 06:00 and 09:00.
const MORNING_START_BOOST: f32 = 0.4;

/// Capacity at or below this reads as intimate.
const INTIMATE_CAPACITY: u32 = 30;
/// Capacity at or above this reads as a large community gathering.
const COMMUNITY_CAPACITY: u32 = 200;
/// Social-scale adjustment applied at the capacity thresholds.
const CAPACITY_ADJUST: f32 = 0.4;

/// Nightlife contribution of a 19+/21+ door policy.
const AGE_GATE_NIGHTLIFE: f32 = 0.3;
/// Energy contribution of a 19+/21+ door policy.
const AGE_GATE_ENERGY: f32 = 0.2;
/// Social-scale contribution of an all-ages door policy.
const ALL_AGES_SOCIAL: f32 = 0.3;

/// Partial weight vectors per known vibe tag, matched case-insensitively.
/// Unknown tags contribute nothing.
const VIBE_WEIGHTS: &[(&str, &[(Axis, f32)])] = &[
    ("chill", &[(Axis::Energy, -0.6), (Axis::Wellness, 0.2)]),
    ("wild", &[(Axis::Energy, 0.9), (Axis::Nightlife, 0.4)]),
    ("loud", &[(Axis::Energy, 0.7), (Axis::Nightlife, 0.3)]),
    ("quiet", &[(Axis::Energy, -0.7), (Axis::SocialScale, -0.3)]),
    ("rowdy", &[(Axis::Energy, 0.8), (Axis::Nightlife, 0.5)]),
    ("artsy", &[(Axis::Creativity, 0.9)]),
    ("creative", &[(Axis::Creativity, 0.8)]),
    ("crafty", &[(Axis::Creativity, 0.6), (Axis::SocialScale, -0.2)]),
    ("foodie", &[(Axis::Food, 0.9)]),
    ("boozy", &[(Axis::Nightlife, 0.8), (Axis::Energy, 0.3)]),
    ("zen", &[(Axis::Wellness, 0.9), (Axis::Energy, -0.5)]),
    ("sweaty", &[(Axis::Activity, 0.9), (Axis::Energy, 0.4)]),
    ("sporty", &[(Axis::Activity, 0.8)]),
    ("outdoorsy", &[(Axis::Activity, 0.6), (Axis::Wellness, 0.3)]),
    ("nerdy", &[(Axis::Professional, 0.5), (Axis::Creativity, 0.3)]),
    ("networky", &[(Axis::Professional, 0.9), (Axis::SocialScale, 0.3)]),
    ("cozy", &[(Axis::SocialScale, -0.6), (Axis::Energy, -0.3)]),
    ("intimate", &[(Axis::SocialScale, -0.8)]),
    ("community", &[(Axis::SocialScale, 0.8)]),
    ("late-night", &[(Axis::Nightlife, 0.9)]),
];

/// Partial weight vectors per event type, scaled by
/// [`EVENT_TYPE_MULTIPLIER`] during accumulation.
const fn event_type_weights(event_type: blockparty_core::EventType) -> &'static [(Axis, f32)] {
    use blockparty_core::EventType;
    match event_type {
        EventType::Party => &[
            (Axis::Energy, 0.8),
            (Axis::Nightlife, 0.9),
            (Axis::SocialScale, 0.3),
        ],
        EventType::Wellness => &[(Axis::Wellness, 0.9), (Axis::Energy, -0.4)],
        EventType::Food => &[(Axis::Food, 0.9), (Axis::SocialScale, 0.2)],
        EventType::Art => &[(Axis::Creativity, 0.9)],
        EventType::Sports => &[(Axis::Activity, 0.9), (Axis::Energy, 0.5)],
        EventType::Networking => &[(Axis::Professional, 0.9), (Axis::SocialScale, 0.4)],
        EventType::Music => &[
            (Axis::Creativity, 0.5),
            (Axis::Nightlife, 0.6),
            (Axis::Energy, 0.5),
        ],
        EventType::Market => &[
            (Axis::Food, 0.4),
            (Axis::SocialScale, 0.5),
            (Axis::Creativity, 0.2),
        ],
        EventType::Outdoors => &[(Axis::Activity, 0.7), (Axis::Wellness, 0.4)],
        EventType::Other => &[],
    }
}

/// A family of lowercase substring patterns sharing one partial weight
/// vector. Patterns are independent: every match contributes.
struct KeywordGroup {
    patterns: &'static [&'static str],
    weights: &'static [(Axis, f32)],
}

const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        patterns: &["rave", "dance party", "high energy", "all night"],
        weights: &[(Axis::Energy, 0.4)],
    },
    KeywordGroup {
        patterns: &["art", "gallery", "paint", "craft", "poetry", "open mic"],
        weights: &[(Axis::Creativity, 0.35)],
    },
    KeywordGroup {
        patterns: &["meetup", "community", "potluck", "block party", "neighbours"],
        weights: &[(Axis::SocialScale, 0.3)],
    },
    KeywordGroup {
        patterns: &["dinner", "tasting", "brunch", "bbq", "pizza", "wine", "supper"],
        weights: &[(Axis::Food, 0.35)],
    },
    KeywordGroup {
        patterns: &["run club", "hike", "climb", "pickup", "skate", "bike ride"],
        weights: &[(Axis::Activity, 0.35)],
    },
    KeywordGroup {
        patterns: &["club night", "dj", "late night", "bar crawl", "afterparty"],
        weights: &[(Axis::Nightlife, 0.4), (Axis::Energy, 0.15)],
    },
    KeywordGroup {
        patterns: &["networking", "startup", "founders", "career", "workshop"],
        weights: &[(Axis::Professional, 0.35)],
    },
    KeywordGroup {
        patterns: &["yoga", "meditation", "breathwork", "sound bath", "mindful"],
        weights: &[(Axis::Wellness, 0.4)],
    },
];

#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "axis indices are statically below EMBED_DIM and accumulation is additive"
)]
fn apply(accumulator: &mut [f32; EMBED_DIM], weights: &[(Axis, f32)], scale: f32) {
    for (axis, weight) in weights {
        accumulator[axis.index()] += weight * scale;
    }
}

fn vibe_weights(tag: &str) -> Option<&'static [(Axis, f32)]> {
    let needle = tag.to_lowercase();
    VIBE_WEIGHTS
        .iter()
        .find(|(known, _)| *known == needle)
        .map(|(_, weights)| *weights)
}

/// Compute the feature vector for an event.
///
/// Pure and deterministic: the same unchanged event always yields a
/// bit-identical vector. Events with no matching signal yield the zero
/// vector.
///
/// # Examples
/// ```
/// use blockparty_core::{Axis, Event, EventType};
/// use blockparty_scorer::embed;
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> Result<(), blockparty_core::EventError> {
/// let start = Utc.with_ymd_and_hms(2026, 8, 7, 22, 0, 0).single().unwrap();
/// let event = Event::new("ev-1", "Warehouse social", "host-1", EventType::Party, start)?
///     .with_vibes(["Wild".into(), "Loud".into()]);
/// let embedding = embed(&event);
/// assert!(embedding.axis(Axis::Energy) > 0.4);
/// assert!(embedding.axis(Axis::Nightlife) > 0.4);
/// # Ok(())
/// # }
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "axis indices are statically below EMBED_DIM and adjustments are additive"
)]
pub fn embed(event: &Event) -> Embedding {
    let mut accumulator = [0.0_f32; EMBED_DIM];

    for tag in &event.vibes {
        if let Some(weights) = vibe_weights(tag) {
            apply(&mut accumulator, weights, 1.0);
        }
    }

    apply(
        &mut accumulator,
        event_type_weights(event.event_type),
        EVENT_TYPE_MULTIPLIER,
    );

    let text = format!("{} {}", event.title, event.description).to_lowercase();
    for group in KEYWORD_GROUPS {
        for pattern in group.patterns {
            if text.contains(pattern) {
                apply(&mut accumulator, group.weights, 1.0);
            }
        }
    }

    let hour = event.start_time.hour();
    if hour >= 18 || hour <= 2 {
        accumulator[Axis::Nightlife.index()] += NIGHT_START_BOOST;
    }
    if (6..=9).contains(&hour) {
        accumulator[Axis::Wellness.index()] += MORNING_START_BOOST;
    }

    match event.capacity {
        Some(capacity) if capacity <= INTIMATE_CAPACITY => {
            accumulator[Axis::SocialScale.index()] -= CAPACITY_ADJUST;
        }
        Some(capacity) if capacity >= COMMUNITY_CAPACITY => {
            accumulator[Axis::SocialScale.index()] += CAPACITY_ADJUST;
        }
        _ => {}
    }

    match event.age_restriction {
        Some(AgeRestriction::NineteenPlus | AgeRestriction::TwentyOnePlus) => {
            accumulator[Axis::Nightlife.index()] += AGE_GATE_NIGHTLIFE;
            accumulator[Axis::Energy.index()] += AGE_GATE_ENERGY;
        }
        Some(AgeRestriction::AllAges) => {
            accumulator[Axis::SocialScale.index()] += ALL_AGES_SOCIAL;
        }
        None => {}
    }

    Embedding::normalised(accumulator)
}
