//! Interaction log entries and RSVP records.
//!
//! Interactions are append-only: once recorded they are never edited, and
//! they drive both feedback mutation and taste-vector aggregation.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// What a user did with an event.
///
/// # Examples
/// ```
/// use blockparty_core::InteractionAction;
///
/// assert_eq!(InteractionAction::Cosign.as_str(), "cosign");
/// assert_eq!("hide".parse::<InteractionAction>().ok(), Some(InteractionAction::Hide));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InteractionAction {
    /// Opened the event's detail view.
    View,
    /// Publicly vouched for the event.
    Cosign,
    /// Committed to attending.
    Going,
    /// Asked not to see the event again.
    Hide,
}

impl InteractionAction {
    /// Return the action as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Cosign => "cosign",
            Self::Going => "going",
            Self::Hide => "hide",
        }
    }

    /// Whether the action expresses positive intent towards the event.
    ///
    /// Positive actions feed host trust; negative ones only touch
    /// popularity.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Cosign | Self::Going)
    }
}

impl std::fmt::Display for InteractionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InteractionAction {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "cosign" => Ok(Self::Cosign),
            "going" => Ok(Self::Going),
            "hide" => Ok(Self::Hide),
            unknown => Err(InteractionError::UnknownAction {
                value: unknown.to_owned(),
            }),
        }
    }
}

/// Errors returned when constructing interaction or RSVP records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    /// The user identifier was empty.
    #[error("interaction user id must be non-empty")]
    MissingUser,
    /// The event identifier was empty.
    #[error("interaction event id must be non-empty")]
    MissingEvent,
    /// An action string did not match any known variant.
    #[error("unknown interaction action '{value}'")]
    UnknownAction {
        /// The rejected input.
        value: String,
    },
    /// An RSVP status string did not match any known variant.
    #[error("unknown RSVP status '{value}'")]
    UnknownStatus {
        /// The rejected input.
        value: String,
    },
}

/// One append-only log entry recording a user's reaction to an event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interaction {
    /// The reacting user.
    pub user_id: String,
    /// The target event.
    pub event_id: String,
    /// What happened.
    pub action: InteractionAction,
    /// Milliseconds spent on the detail view, recorded for views only.
    pub dwell_ms: Option<u32>,
    /// When the interaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// Validate and construct an [`Interaction`].
    ///
    /// # Errors
    /// Returns [`InteractionError`] when either identifier is empty.
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        action: InteractionAction,
        dwell_ms: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InteractionError> {
        let user_id = user_id.into();
        let event_id = event_id.into();
        if user_id.trim().is_empty() {
            return Err(InteractionError::MissingUser);
        }
        if event_id.trim().is_empty() {
            return Err(InteractionError::MissingEvent);
        }
        Ok(Self {
            user_id,
            event_id,
            action,
            dwell_ms,
            created_at,
        })
    }
}

/// Commitment level of an RSVP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RsvpStatus {
    /// Confirmed attendance.
    Going,
    /// Expressed interest without committing.
    Interested,
    /// Undecided.
    Maybe,
}

impl RsvpStatus {
    /// Return the status as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Interested => "interested",
            Self::Maybe => "maybe",
        }
    }
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "going" => Ok(Self::Going),
            "interested" => Ok(Self::Interested),
            "maybe" => Ok(Self::Maybe),
            unknown => Err(InteractionError::UnknownStatus {
                value: unknown.to_owned(),
            }),
        }
    }
}

/// At-most-one attendance record per (user, event) pair.
///
/// Repeat RSVPs upsert the status; cancellation deletes the record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rsvp {
    /// The attending user.
    pub user_id: String,
    /// The target event.
    pub event_id: String,
    /// Commitment level.
    pub status: RsvpStatus,
}

impl Rsvp {
    /// Validate and construct an [`Rsvp`].
    ///
    /// # Errors
    /// Returns [`InteractionError`] when either identifier is empty.
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        status: RsvpStatus,
    ) -> Result<Self, InteractionError> {
        let user_id = user_id.into();
        let event_id = event_id.into();
        if user_id.trim().is_empty() {
            return Err(InteractionError::MissingUser);
        }
        if event_id.trim().is_empty() {
            return Err(InteractionError::MissingEvent);
        }
        Ok(Self {
            user_id,
            event_id,
            status,
        })
    }
}
