//! User domain model: vibe preferences, trust, and the cached taste vector.

use thiserror::Error;

use crate::embedding::EMBED_DIM;

/// Errors returned by [`User::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// The identifier was empty or whitespace.
    #[error("user id must be non-empty")]
    MissingId,
}

/// A member of the community who browses, hosts, and reacts to events.
///
/// The taste vector is derived state: empty until the aggregator has
/// computed it, and either empty or exactly [`EMBED_DIM`] unit-normalised
/// floats afterwards.
///
/// # Examples
/// ```
/// use blockparty_core::User;
///
/// # fn main() -> Result<(), blockparty_core::UserError> {
/// let user = User::new("user-1", "Sam")?.with_vibe_prefs(["Chill".into()]);
/// assert!(user.taste_vector.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Display name shown on hosted events.
    pub display_name: String,
    /// Vibe tags the user has opted into.
    pub vibe_prefs: Vec<String>,
    /// Cached taste vector; empty when no signal has been aggregated yet.
    pub taste_vector: Vec<f32>,
    /// Host track record, clamped to `[0.0, 1.0]` by the store.
    pub trust_score: f32,
}

impl User {
    /// Validate and construct a [`User`] with no preferences or taste signal.
    ///
    /// # Errors
    /// Returns [`UserError::MissingId`] when the id is empty or whitespace.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Result<Self, UserError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserError::MissingId);
        }
        Ok(Self {
            id,
            display_name: display_name.into(),
            vibe_prefs: Vec::new(),
            taste_vector: Vec::new(),
            trust_score: 0.0,
        })
    }

    /// Attach vibe preferences while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_vibe_prefs<I>(mut self, prefs: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.vibe_prefs = prefs.into_iter().collect();
        self
    }

    /// Attach a trust score while consuming `self`.
    #[must_use]
    pub const fn with_trust_score(mut self, trust: f32) -> Self {
        self.trust_score = trust;
        self
    }

    /// Attach a pre-computed taste vector while consuming `self`.
    ///
    /// Vectors of the wrong dimensionality are discarded rather than
    /// stored, so downstream cosine lookups degrade to zero instead of
    /// comparing mismatched vectors.
    #[must_use]
    pub fn with_taste_vector(mut self, taste: Vec<f32>) -> Self {
        if taste.len() == EMBED_DIM {
            self.taste_vector = taste;
        }
        self
    }
}
