//! Aggregate a user's taste vector from the embeddings of events they
//! interacted with.
//!
//! Each signal is weighted by action kind, decayed by recency, and (for
//! views) boosted by dwell time. The running sum is divided by the sum
//! of absolute weights and L2-normalised, so hides steer the vector away
//! from an event without inflating its magnitude.

use blockparty_core::{EMBED_DIM, Embedding, Interaction, InteractionAction};
use chrono::{DateTime, Utc};

/// Seconds per day used for recency arithmetic.
const SECONDS_PER_DAY: f32 = 86_400.0;
/// Dwell milliseconds that amount to one extra unit of view weight.
const DWELL_MS_SCALE: f32 = 30_000.0;
/// Upper bound on the dwell-time multiplier.
const DWELL_BOOST_CAP: f32 = 2.0;

/// One interaction joined with the embedding of its target event.
///
/// Signals whose event has no stored embedding are skipped during
/// aggregation rather than erred on.
#[derive(Debug, Clone)]
pub struct TasteSignal {
    /// The recorded interaction.
    pub interaction: Interaction,
    /// Embedding of the interacted event, when one is stored.
    pub embedding: Option<Embedding>,
}

/// Tuning knobs for taste aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TasteOptions {
    /// Weight of a "going" interaction.
    pub going_weight: f32,
    /// Weight of a "cosign" interaction.
    pub cosign_weight: f32,
    /// Weight of a "view" interaction.
    pub view_weight: f32,
    /// Weight of a "hide" interaction; negative steers the vector away.
    pub hide_weight: f32,
    /// Whether older interactions count for less.
    pub recency_decay: bool,
    /// Days after which an interaction's weight halves.
    pub half_life_days: f32,
}

impl Default for TasteOptions {
    fn default() -> Self {
        Self {
            going_weight: 1.0,
            cosign_weight: 0.8,
            view_weight: 0.1,
            hide_weight: -0.5,
            recency_decay: true,
            half_life_days: 30.0,
        }
    }
}

impl TasteOptions {
    /// Base weight for an action before decay and dwell adjustments.
    #[must_use]
    pub const fn action_weight(&self, action: InteractionAction) -> f32 {
        match action {
            InteractionAction::Going => self.going_weight,
            InteractionAction::Cosign => self.cosign_weight,
            InteractionAction::View => self.view_weight,
            InteractionAction::Hide => self.hide_weight,
        }
    }
}

/// Compute a user's taste vector from their interaction history.
///
/// Returns an empty vector when no signal carries an embedding, and a
/// unit-normalised [`EMBED_DIM`]-wide vector otherwise. The evaluation
/// timestamp is an explicit parameter so recency decay stays pure.
///
/// # Examples
/// ```
/// use blockparty_scorer::{TasteOptions, aggregate_taste};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// assert!(aggregate_taste(&[], &TasteOptions::default(), now).is_empty());
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "taste aggregation is weighted floating-point averaging over bounded inputs"
)]
pub fn aggregate_taste(
    signals: &[TasteSignal],
    options: &TasteOptions,
    now: DateTime<Utc>,
) -> Vec<f32> {
    let mut sum = [0.0_f32; EMBED_DIM];
    let mut weight_total = 0.0_f32;

    for signal in signals {
        let Some(embedding) = &signal.embedding else {
            continue;
        };
        let mut weight = options.action_weight(signal.interaction.action);

        if options.recency_decay {
            let elapsed = (now - signal.interaction.created_at).num_seconds() as f32;
            let days = elapsed / SECONDS_PER_DAY;
            weight *= 0.5_f32.powf(days / options.half_life_days);
        }

        if signal.interaction.action == InteractionAction::View {
            if let Some(dwell_ms) = signal.interaction.dwell_ms {
                let boost = (1.0 + dwell_ms as f32 / DWELL_MS_SCALE).min(DWELL_BOOST_CAP);
                weight *= boost;
            }
        }

        for (slot, value) in sum.iter_mut().zip(embedding.as_slice()) {
            *slot += weight * value;
        }
        weight_total += weight.abs();
    }

    if weight_total == 0.0 {
        return Vec::new();
    }

    let averaged = sum.map(|value| value / weight_total);
    let normalised = Embedding::normalised(averaged);
    if normalised.is_zero() {
        Vec::new()
    } else {
        normalised.as_slice().to_vec()
    }
}
