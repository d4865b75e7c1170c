//! Fixed-width feature vectors describing an event's character.
//!
//! Every embedding has exactly [`EMBED_DIM`] dimensions with stable
//! semantics. Non-zero vectors carry unit L2 norm; the all-zero vector
//! represents "no signal" and is preserved as-is.

/// Number of dimensions in every event embedding and taste vector.
pub const EMBED_DIM: usize = 8;

/// Semantic meaning of each embedding dimension, in storage order.
///
/// # Examples
/// ```
/// use blockparty_core::Axis;
///
/// assert_eq!(Axis::Energy.index(), 0);
/// assert_eq!(Axis::Wellness.index(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Chill (negative) through wild (positive).
    Energy,
    /// Creative and artistic character.
    Creativity,
    /// Intimate (negative) through large community (positive).
    SocialScale,
    /// Food focus.
    Food,
    /// Physical activity.
    Activity,
    /// Nightlife intensity.
    Nightlife,
    /// Professional and networking character.
    Professional,
    /// Wellness and restorative character.
    Wellness,
}

impl Axis {
    /// All axes in storage order.
    pub const ALL: [Self; EMBED_DIM] = [
        Self::Energy,
        Self::Creativity,
        Self::SocialScale,
        Self::Food,
        Self::Activity,
        Self::Nightlife,
        Self::Professional,
        Self::Wellness,
    ];

    /// Position of this axis within an embedding.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Energy => 0,
            Self::Creativity => 1,
            Self::SocialScale => 2,
            Self::Food => 3,
            Self::Activity => 4,
            Self::Nightlife => 5,
            Self::Professional => 6,
            Self::Wellness => 7,
        }
    }
}

/// An 8-dimensional feature vector with unit (or zero) L2 norm.
///
/// # Examples
/// ```
/// use blockparty_core::{Axis, Embedding};
///
/// let embedding = Embedding::normalised([3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// assert!((embedding.axis(Axis::Energy) - 0.6).abs() < 1e-6);
/// assert!((embedding.norm() - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Embedding {
    values: [f32; EMBED_DIM],
}

impl Embedding {
    /// The all-zero "no signal" embedding.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            values: [0.0; EMBED_DIM],
        }
    }

    /// Normalise raw accumulator values into an embedding.
    ///
    /// The all-zero accumulator stays zero; anything else is scaled to
    /// unit L2 norm.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "normalisation divides by the vector's L2 norm"
    )]
    pub fn normalised(raw: [f32; EMBED_DIM]) -> Self {
        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Self::zero();
        }
        Self {
            values: raw.map(|v| v / norm),
        }
    }

    /// Reconstruct an embedding from persisted values without rescaling.
    ///
    /// Trusted store reads only; the stored vector already satisfies the
    /// norm invariant.
    #[must_use]
    pub const fn from_stored(values: [f32; EMBED_DIM]) -> Self {
        Self { values }
    }

    /// Value along one semantic axis.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "axis indices are statically below EMBED_DIM"
    )]
    pub const fn axis(&self, axis: Axis) -> f32 {
        self.values[axis.index()]
    }

    /// Borrow the embedding as a plain slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// L2 norm of the vector.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "norm computation squares and sums components"
    )]
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Whether every component is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// Cosine similarity between two vectors.
///
/// Defined as exactly `0.0` for empty, mismatched, or zero-norm inputs;
/// no error is ever raised. Finite inputs of equal length yield a value
/// in `[-1.0, 1.0]`.
///
/// # Examples
/// ```
/// use blockparty_core::cosine_similarity;
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
/// assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 1.0]) - 1.0).abs() < 1e-6);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "cosine similarity is a dot product over two norms"
)]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn normalised_vector_has_unit_norm() {
        let embedding = Embedding::normalised([1.0, 2.0, 3.0, 4.0, 0.5, 0.0, -1.0, 2.5]);
        assert!((embedding.norm() - 1.0).abs() < 1e-6);
    }

    #[rstest]
    fn zero_accumulator_stays_zero() {
        let embedding = Embedding::normalised([0.0; EMBED_DIM]);
        assert!(embedding.is_zero());
        assert_eq!(embedding, Embedding::zero());
    }

    #[rstest]
    fn axis_order_is_stable() {
        for (position, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), position);
        }
    }

    #[rstest]
    fn cosine_of_identical_nonzero_vectors_is_one() {
        let v = [0.3_f32, -0.4, 0.0, 0.8, 0.1, 0.0, 0.2, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[rstest]
    fn cosine_is_symmetric() {
        let a = [1.0_f32, 2.0, 0.0, -1.0, 0.5, 0.0, 0.0, 3.0];
        let b = [0.0_f32, 1.0, 1.0, 2.0, -0.5, 1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-9);
    }

    #[rstest]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = [1.0_f32, 0.0];
        let b = [0.0_f32, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[], &[1.0])]
    #[case(&[1.0, 2.0], &[1.0])]
    #[case(&[0.0, 0.0], &[1.0, 1.0])]
    fn degenerate_inputs_yield_exactly_zero(#[case] a: &[f32], #[case] b: &[f32]) {
        assert_eq!(cosine_similarity(a, b), 0.0);
    }

    #[rstest]
    fn cosine_is_bounded() {
        let a = [1e30_f32, 1e30, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let b = [1e30_f32, 1e30, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let similarity = cosine_similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&similarity));
    }
}
