//! Blend vibe overlap, distance, urgency, popularity, trust, and taste
//! similarity into one ranked score per candidate event.
//!
//! The engine is stateless per request: it reads a snapshot through the
//! store traits, computes scores over request-local data, and returns a
//! sorted, truncated feed. The six component weights are an explicit
//! immutable value passed in at construction, never ambient statics.

use std::collections::{HashMap, HashSet};

use blockparty_core::{
    Embedding, Event, EventStore, InteractionStore, TimeBucket, User, UserStore, WhenFilter,
    bucket_start_time, cosine_similarity, haversine_km, time_window,
};
use chrono::{DateTime, Utc};
use geo::Coord;
use log::debug;

use crate::error::RecommendError;
use crate::taste::{TasteOptions, TasteSignal, aggregate_taste};

/// Default search radius in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
/// Default number of results returned.
pub const DEFAULT_MAX_RESULTS: usize = 20;
/// Hard cap on results regardless of the requested maximum.
pub const MAX_RESULTS_CAP: usize = 50;

/// Weight of one RSVP relative to one unit of popularity score.
const RSVP_POPULARITY_WEIGHT: f32 = 0.1;
/// Host trust at or above this earns the "trusted host" reason.
const TRUSTED_HOST_THRESHOLD: f32 = 0.7;
/// Popularity signal at or above this earns the "trending" reason.
const TRENDING_THRESHOLD: f32 = 2.0;
/// Cosine similarity at or above this earns the "taste match" reason.
const TASTE_MATCH_THRESHOLD: f32 = 0.6;
/// Fraction of the radius considered "very close".
const VERY_CLOSE_FRACTION: f64 = 0.4;
/// Lower bound of the "very close" band in kilometres.
const VERY_CLOSE_FLOOR_KM: f64 = 1.0;

const ENV_WEIGHT_VIBE: &str = "BLOCKPARTY_WEIGHT_VIBE";
const ENV_WEIGHT_DISTANCE: &str = "BLOCKPARTY_WEIGHT_DISTANCE";
const ENV_WEIGHT_TIME: &str = "BLOCKPARTY_WEIGHT_TIME";
const ENV_WEIGHT_POPULARITY: &str = "BLOCKPARTY_WEIGHT_POPULARITY";
const ENV_WEIGHT_TRUST: &str = "BLOCKPARTY_WEIGHT_TRUST";
const ENV_WEIGHT_EMBED: &str = "BLOCKPARTY_WEIGHT_EMBED";

/// Multipliers applied to each scoring component.
///
/// Constructed once at process start (optionally from the environment)
/// and passed into the engine by parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendWeights {
    /// Multiplier per overlapping vibe tag.
    pub vibe: f32,
    /// Multiplier on the linear distance falloff.
    pub distance: f32,
    /// Multiplier on the temporal urgency factor.
    pub time: f32,
    /// Multiplier on popularity plus RSVP signal.
    pub popularity: f32,
    /// Multiplier on host trust.
    pub trust: f32,
    /// Multiplier on taste-vector cosine similarity.
    pub embed: f32,
}

impl Default for RecommendWeights {
    fn default() -> Self {
        Self {
            vibe: 2.0,
            distance: 1.5,
            time: 1.2,
            popularity: 1.0,
            trust: 1.0,
            embed: 2.5,
        }
    }
}

impl RecommendWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidWeights`] when any weight is
    /// non-finite or negative, or when the total is zero.
    #[expect(
        clippy::float_arithmetic,
        reason = "validation sums weights to ensure a non-zero total"
    )]
    pub fn validate(self) -> Result<Self, RecommendError> {
        let total = self.vibe + self.distance + self.time + self.popularity + self.trust
            + self.embed;
        let all_valid = [
            self.vibe,
            self.distance,
            self.time,
            self.popularity,
            self.trust,
            self.embed,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0);
        if all_valid && total > 0.0 {
            Ok(self)
        } else {
            Err(RecommendError::InvalidWeights)
        }
    }

    /// Build weights from process environment overrides, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    /// Returns [`RecommendError::WeightParse`] for unparseable overrides
    /// and [`RecommendError::InvalidWeights`] for unusable values.
    pub fn from_env() -> Result<Self, RecommendError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build weights from an injected lookup, used by tests and callers
    /// that layer their own configuration.
    ///
    /// # Errors
    /// Returns [`RecommendError::WeightParse`] for unparseable overrides
    /// and [`RecommendError::InvalidWeights`] for unusable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RecommendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let resolve = |name: &str, fallback: f32| -> Result<f32, RecommendError> {
            lookup(name).map_or(Ok(fallback), |raw| {
                raw.parse::<f32>().map_err(|_| RecommendError::WeightParse {
                    name: name.to_owned(),
                    value: raw,
                })
            })
        };
        Self {
            vibe: resolve(ENV_WEIGHT_VIBE, defaults.vibe)?,
            distance: resolve(ENV_WEIGHT_DISTANCE, defaults.distance)?,
            time: resolve(ENV_WEIGHT_TIME, defaults.time)?,
            popularity: resolve(ENV_WEIGHT_POPULARITY, defaults.popularity)?,
            trust: resolve(ENV_WEIGHT_TRUST, defaults.trust)?,
            embed: resolve(ENV_WEIGHT_EMBED, defaults.embed)?,
        }
        .validate()
    }
}

/// Parameters for a recommendation request.
///
/// # Examples
/// ```
/// use blockparty_scorer::RecommendRequest;
/// use geo::Coord;
///
/// let request = RecommendRequest::new("user-1", Coord { x: -79.38, y: 43.65 });
/// assert_eq!(request.radius_km, 10.0);
/// assert_eq!(request.max, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecommendRequest {
    /// The requesting user.
    pub user_id: String,
    /// Where the user is searching from (WGS84, `x = longitude`).
    pub location: Coord<f64>,
    /// Search radius in kilometres; candidates beyond it are excluded.
    #[cfg_attr(feature = "serde", serde(default = "default_radius_km"))]
    pub radius_km: f64,
    /// Optional time-window preference.
    #[cfg_attr(feature = "serde", serde(default))]
    pub when: Option<WhenFilter>,
    /// Extra vibe filters unioned with the user's stored preferences.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vibes: Vec<String>,
    /// Requested maximum number of results, capped at
    /// [`MAX_RESULTS_CAP`].
    #[cfg_attr(feature = "serde", serde(default = "default_max_results"))]
    pub max: usize,
}

#[cfg(feature = "serde")]
const fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

#[cfg(feature = "serde")]
const fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl RecommendRequest {
    /// Build a request with default radius, max, and no filters.
    #[must_use]
    pub fn new(user_id: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            user_id: user_id.into(),
            location,
            radius_km: DEFAULT_RADIUS_KM,
            when: None,
            vibes: Vec::new(),
            max: DEFAULT_MAX_RESULTS,
        }
    }

    /// Validate the request before any scoring runs.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidRequest`] naming the offending
    /// field.
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.user_id.trim().is_empty() {
            return Err(RecommendError::InvalidRequest {
                field: "user_id",
                message: "must be non-empty".to_owned(),
            });
        }
        if !(-90.0..=90.0).contains(&self.location.y) {
            return Err(RecommendError::InvalidRequest {
                field: "location.lat",
                message: format!("{} is outside -90..=90", self.location.y),
            });
        }
        if !(-180.0..=180.0).contains(&self.location.x) {
            return Err(RecommendError::InvalidRequest {
                field: "location.lng",
                message: format!("{} is outside -180..=180", self.location.x),
            });
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(RecommendError::InvalidRequest {
                field: "radius_km",
                message: "must be a positive number".to_owned(),
            });
        }
        if self.max == 0 {
            return Err(RecommendError::InvalidRequest {
                field: "max",
                message: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Per-component contributions to a candidate's total score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBreakdown {
    /// Vibe-overlap contribution.
    pub vibe: f32,
    /// Distance-falloff contribution.
    pub distance: f32,
    /// Temporal-urgency contribution.
    pub time: f32,
    /// Popularity contribution.
    pub popularity: f32,
    /// Host-trust contribution.
    pub trust: f32,
    /// Taste-similarity contribution.
    pub embedding: f32,
}

/// One candidate event with its score, distance, and reasons.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredEvent {
    /// The candidate event, inlined into the response payload.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub event: Event,
    /// Great-circle distance from the request location, when known.
    pub distance_km: Option<f64>,
    /// Total score, rounded to three decimal places.
    pub score: f32,
    /// Per-component contributions.
    pub breakdown: ScoreBreakdown,
    /// Human-readable explanations derived from the same signals.
    pub reasons: Vec<String>,
}

/// A ranked recommendation feed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendations {
    /// When the feed was computed.
    pub generated_at: DateTime<Utc>,
    /// Number of events returned.
    pub count: usize,
    /// Scored events, highest first.
    pub events: Vec<ScoredEvent>,
}

/// Stateless scoring engine parameterised by validated weights.
///
/// Safe to share across threads: every call works on request-local data.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    weights: RecommendWeights,
    taste_options: TasteOptions,
}

impl RecommendationEngine {
    /// Construct an engine from weights, validating them once up front.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidWeights`] for unusable weights.
    pub fn new(weights: RecommendWeights) -> Result<Self, RecommendError> {
        Ok(Self {
            weights: weights.validate()?,
            taste_options: TasteOptions::default(),
        })
    }

    /// Construct an engine with explicit taste-aggregation options.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidWeights`] for unusable weights.
    pub fn with_taste_options(
        weights: RecommendWeights,
        taste_options: TasteOptions,
    ) -> Result<Self, RecommendError> {
        Ok(Self {
            weights: weights.validate()?,
            taste_options,
        })
    }

    /// The validated weights in use.
    #[must_use]
    pub const fn weights(&self) -> RecommendWeights {
        self.weights
    }

    /// Serve one recommendation request against a store snapshot.
    ///
    /// Candidates beyond the radius (or without coordinates) are
    /// excluded outright; degraded signals — missing embedding, empty
    /// taste vector, unknown host — zero the relevant component instead
    /// of failing the request.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidRequest`] before scoring,
    /// [`RecommendError::UserNotFound`] for an unknown user, and
    /// propagates store failures uncategorised.
    pub fn recommend<S>(
        &self,
        store: &S,
        request: &RecommendRequest,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, RecommendError>
    where
        S: EventStore + UserStore + InteractionStore,
    {
        request.validate()?;
        let user = store
            .user(&request.user_id)?
            .ok_or_else(|| RecommendError::UserNotFound {
                id: request.user_id.clone(),
            })?;

        let taste = self.resolve_taste(store, &user, now)?;
        let preferred = preferred_vibes(&user, request);
        let window = request.when.map(|when| time_window(when, now));
        let candidates = store.events_near(request.location, request.radius_km, window.as_ref())?;
        debug!(
            "scoring {} candidates for user {}",
            candidates.len(),
            user.id
        );

        let mut host_trust = HashMap::new();
        let mut scored = Vec::with_capacity(candidates.len());
        for event in candidates {
            let embedding = store.embedding(&event.id)?;
            let rsvps = store.rsvp_count(&event.id)?;
            let trust = self.host_trust(store, &mut host_trust, &event)?;
            if let Some(entry) = self.score_event(
                event,
                embedding,
                &preferred,
                &taste,
                trust,
                rsvps,
                request,
                now,
            ) {
                scored.push(entry);
            }
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.max.min(MAX_RESULTS_CAP));

        Ok(Recommendations {
            generated_at: now,
            count: scored.len(),
            events: scored,
        })
    }

    /// Resolve the user's taste vector through the documented fallback
    /// chain: cached vector, then recompute from interaction history,
    /// then empty (no taste signal).
    fn resolve_taste<S>(
        &self,
        store: &S,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<Vec<f32>, RecommendError>
    where
        S: EventStore + UserStore + InteractionStore,
    {
        if !user.taste_vector.is_empty() {
            return Ok(user.taste_vector.clone());
        }

        let interactions = store.interactions_for(&user.id)?;
        if interactions.is_empty() {
            return Ok(Vec::new());
        }

        let mut signals = Vec::with_capacity(interactions.len());
        for interaction in interactions {
            let embedding = store.embedding(&interaction.event_id)?;
            signals.push(TasteSignal {
                interaction,
                embedding,
            });
        }
        let taste = aggregate_taste(&signals, &self.taste_options, now);

        if !taste.is_empty() {
            // Cache for the next read; a failed write only costs a recompute.
            if let Err(err) = store.save_taste_vector(&user.id, &taste) {
                debug!("taste cache write failed for {}: {err}", user.id);
            }
        }
        Ok(taste)
    }

    /// Host trust with the documented fallback: the hosting user's trust
    /// when the host resolves, otherwise the event's own trust field.
    fn host_trust<S>(
        &self,
        store: &S,
        cache: &mut HashMap<String, Option<f32>>,
        event: &Event,
    ) -> Result<f32, RecommendError>
    where
        S: UserStore,
    {
        let _ = self;
        let cached = match cache.get(&event.host_id) {
            Some(entry) => *entry,
            None => {
                let looked_up = store.user(&event.host_id)?.map(|host| host.trust_score);
                cache.insert(event.host_id.clone(), looked_up);
                looked_up
            }
        };
        Ok(cached.unwrap_or(event.trust_score))
    }

    /// Score one candidate, or `None` when the hard radius filter
    /// excludes it.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::too_many_arguments,
        reason = "score blending is bounded floating-point weighting over request-local data"
    )]
    fn score_event(
        &self,
        event: Event,
        embedding: Option<Embedding>,
        preferred_vibes: &HashSet<String>,
        taste: &[f32],
        host_trust: f32,
        rsvp_count: u64,
        request: &RecommendRequest,
        now: DateTime<Utc>,
    ) -> Option<ScoredEvent> {
        let distance_km = haversine_km(event.location.coord, Some(request.location));
        // Hard filter: beyond the radius (or unlocatable) means excluded,
        // not penalised.
        let distance_km = match distance_km {
            Some(km) if km <= request.radius_km => Some(km),
            _ => return None,
        };

        let vibe_overlap = event
            .vibes
            .iter()
            .filter(|tag| preferred_vibes.contains(&tag.to_lowercase()))
            .count();
        let vibe = (vibe_overlap as f32) * self.weights.vibe;

        let distance = distance_km.map_or(0.0, |km| {
            let falloff = (1.0 - km / request.radius_km).max(0.0);
            self.weights.distance * (falloff as f32)
        });

        let bucket = bucket_start_time(event.start_time, request.when, now);
        let urgency = match bucket {
            Some(TimeBucket::Now) => 1.0,
            Some(TimeBucket::Tonight) => 0.75,
            Some(TimeBucket::Weekend) => 0.6,
            Some(TimeBucket::Later) | None => 0.4,
        };
        let time = self.weights.time * urgency;

        let popularity_signal =
            event.popularity_score + (rsvp_count as f32) * RSVP_POPULARITY_WEIGHT;
        let popularity = popularity_signal * self.weights.popularity;

        let trust = host_trust * self.weights.trust;

        let similarity = embedding
            .as_ref()
            .map_or(0.0, |emb| cosine_similarity(taste, emb.as_slice()));
        let embed_component = similarity * self.weights.embed;

        let breakdown = ScoreBreakdown {
            vibe,
            distance,
            time,
            popularity,
            trust,
            embedding: embed_component,
        };
        let total = vibe + distance + time + popularity + trust + embed_component;
        let score = (total * 1000.0).round() / 1000.0;

        let reasons = build_reasons(
            vibe_overlap,
            distance_km,
            request.radius_km,
            bucket,
            host_trust,
            popularity_signal,
            similarity,
        );

        Some(ScoredEvent {
            event,
            distance_km,
            score,
            breakdown,
            reasons,
        })
    }
}

/// Union of the user's stored vibe preferences and the request's
/// ad-hoc filters, lowercased for overlap counting.
fn preferred_vibes(user: &User, request: &RecommendRequest) -> HashSet<String> {
    user.vibe_prefs
        .iter()
        .chain(request.vibes.iter())
        .map(|tag| tag.to_lowercase())
        .collect()
}

/// Derive the human-readable reasons from the same signals as the score.
fn build_reasons(
    vibe_overlap: usize,
    distance_km: Option<f64>,
    radius_km: f64,
    bucket: Option<TimeBucket>,
    host_trust: f32,
    popularity_signal: f32,
    similarity: f32,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if vibe_overlap >= 2 {
        reasons.push(format!("matches {vibe_overlap} of your vibes"));
    } else if vibe_overlap == 1 {
        reasons.push("matches one of your vibes".to_owned());
    }

    if let Some(km) = distance_km {
        #[expect(
            clippy::float_arithmetic,
            reason = "the very-close band is a fraction of the radius"
        )]
        let very_close = (radius_km * VERY_CLOSE_FRACTION).max(VERY_CLOSE_FLOOR_KM);
        if km <= very_close {
            reasons.push("very close by".to_owned());
        } else if km <= radius_km {
            reasons.push("in your area".to_owned());
        }
    }

    match bucket {
        Some(TimeBucket::Now) => reasons.push("starting in the next couple of hours".to_owned()),
        Some(TimeBucket::Tonight) => reasons.push("happening tonight".to_owned()),
        Some(TimeBucket::Weekend) => reasons.push("coming up this weekend".to_owned()),
        _ => {}
    }

    if host_trust >= TRUSTED_HOST_THRESHOLD {
        reasons.push("hosted by a trusted organiser".to_owned());
    }
    if popularity_signal >= TRENDING_THRESHOLD {
        reasons.push("trending with locals".to_owned());
    }
    if similarity >= TASTE_MATCH_THRESHOLD {
        reasons.push("similar to events you've liked".to_owned());
    }

    reasons
}
