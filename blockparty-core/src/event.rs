//! Event domain model: the unit of discovery in the Blockparty feed.
//!
//! Constructors validate early and return `Result` so malformed events
//! never reach the scoring path. Field mutation after construction is
//! reserved for trusted store reads.

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

/// Maximum accepted title length in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum accepted description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Broad category of an event.
///
/// The enum offers compile-time safety for the embedder's type table.
///
/// # Examples
/// ```
/// use blockparty_core::EventType;
///
/// assert_eq!(EventType::Party.as_str(), "party");
/// assert_eq!(EventType::Wellness.to_string(), "wellness");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventType {
    /// House parties, block parties, and celebrations.
    Party,
    /// Yoga, meditation, and restorative gatherings.
    Wellness,
    /// Dinners, tastings, and pop-up kitchens.
    Food,
    /// Galleries, crafts, and performances.
    Art,
    /// Pick-up games, runs, and rides.
    Sports,
    /// Professional mixers and meetups.
    Networking,
    /// Gigs, DJ sets, and listening sessions.
    Music,
    /// Street markets and swaps.
    Market,
    /// Hikes, picnics, and park hangs.
    Outdoors,
    /// Anything that fits nowhere else.
    Other,
}

impl EventType {
    /// Return the event type as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Party => "party",
            Self::Wellness => "wellness",
            Self::Food => "food",
            Self::Art => "art",
            Self::Sports => "sports",
            Self::Networking => "networking",
            Self::Music => "music",
            Self::Market => "market",
            Self::Outdoors => "outdoors",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "party" => Ok(Self::Party),
            "wellness" => Ok(Self::Wellness),
            "food" => Ok(Self::Food),
            "art" => Ok(Self::Art),
            "sports" => Ok(Self::Sports),
            "networking" => Ok(Self::Networking),
            "music" => Ok(Self::Music),
            "market" => Ok(Self::Market),
            "outdoors" => Ok(Self::Outdoors),
            "other" => Ok(Self::Other),
            unknown => Err(EventError::UnknownEventType {
                value: unknown.to_owned(),
            }),
        }
    }
}

/// Admission policy attached to an event.
///
/// # Examples
/// ```
/// use blockparty_core::AgeRestriction;
///
/// assert_eq!(AgeRestriction::TwentyOnePlus.as_str(), "21+");
/// assert_eq!("All ages".parse::<AgeRestriction>().ok(), Some(AgeRestriction::AllAges));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgeRestriction {
    /// Open to everyone.
    AllAges,
    /// Nineteen and over.
    NineteenPlus,
    /// Twenty-one and over.
    TwentyOnePlus,
}

impl AgeRestriction {
    /// Return the display form used across the product ("All ages", "19+", "21+").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllAges => "All ages",
            Self::NineteenPlus => "19+",
            Self::TwentyOnePlus => "21+",
        }
    }
}

impl std::fmt::Display for AgeRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeRestriction {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all ages" => Ok(Self::AllAges),
            "19+" => Ok(Self::NineteenPlus),
            "21+" => Ok(Self::TwentyOnePlus),
            unknown => Err(EventError::UnknownAgeRestriction {
                value: unknown.to_owned(),
            }),
        }
    }
}

/// Where an event happens.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`, and may
/// be absent: an event without coordinates is still browsable but cannot
/// participate in radius-bounded retrieval.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLocation {
    /// Geospatial position, when known.
    pub coord: Option<Coord<f64>>,
    /// Free-text venue name.
    pub venue: Option<String>,
    /// Free-text street address.
    pub address: Option<String>,
    /// Free-text neighbourhood label.
    pub neighbourhood: Option<String>,
}

impl EventLocation {
    /// Build a location from latitude and longitude in degrees.
    ///
    /// # Examples
    /// ```
    /// use blockparty_core::EventLocation;
    ///
    /// let loc = EventLocation::from_lat_lng(43.65, -79.38);
    /// assert!(loc.coord.is_some());
    /// ```
    #[must_use]
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self {
            coord: Some(Coord { x: lng, y: lat }),
            ..Self::default()
        }
    }

    /// Attach a venue name while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Attach a neighbourhood label while consuming `self`.
    #[must_use]
    pub fn with_neighbourhood(mut self, neighbourhood: impl Into<String>) -> Self {
        self.neighbourhood = Some(neighbourhood.into());
        self
    }
}

/// Errors returned when constructing or amending an [`Event`].
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    /// The identifier was empty or whitespace.
    #[error("event id must be non-empty")]
    MissingId,
    /// The title was empty or whitespace.
    #[error("event title must be non-empty")]
    MissingTitle,
    /// The title exceeded [`MAX_TITLE_LEN`].
    #[error("event title is {len} characters, maximum is {MAX_TITLE_LEN}")]
    TitleTooLong {
        /// Observed character count.
        len: usize,
    },
    /// The description exceeded [`MAX_DESCRIPTION_LEN`].
    #[error("event description is {len} characters, maximum is {MAX_DESCRIPTION_LEN}")]
    DescriptionTooLong {
        /// Observed character count.
        len: usize,
    },
    /// Latitude was outside `[-90, 90]`.
    #[error("latitude {lat} is outside -90..=90")]
    LatitudeOutOfRange {
        /// Offending latitude in degrees.
        lat: f64,
    },
    /// Longitude was outside `[-180, 180]`.
    #[error("longitude {lng} is outside -180..=180")]
    LongitudeOutOfRange {
        /// Offending longitude in degrees.
        lng: f64,
    },
    /// The end time did not come after the start time.
    #[error("event end time must be after its start time")]
    EndBeforeStart,
    /// The hosting user's identifier was empty.
    #[error("event host id must be non-empty")]
    MissingHost,
    /// An event type string did not match any known variant.
    #[error("unknown event type '{value}'")]
    UnknownEventType {
        /// The rejected input.
        value: String,
    },
    /// An age restriction string did not match any known variant.
    #[error("unknown age restriction '{value}'")]
    UnknownAgeRestriction {
        /// The rejected input.
        value: String,
    },
}

/// A gathering users can discover, host, and RSVP to.
///
/// # Examples
/// ```
/// use blockparty_core::{Event, EventType};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> Result<(), blockparty_core::EventError> {
/// let start = Utc.with_ymd_and_hms(2026, 8, 7, 22, 0, 0).single().unwrap();
/// let event = Event::new("ev-1", "Warehouse social", "user-9", EventType::Party, start)?
///     .with_vibes(["Wild".into(), "Loud".into()]);
/// assert_eq!(event.vibes.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Unique identifier.
    pub id: String,
    /// Short display title.
    pub title: String,
    /// Longer free-text description.
    pub description: String,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// When the event ends, if declared.
    pub end_time: Option<DateTime<Utc>>,
    /// Where the event happens.
    pub location: EventLocation,
    /// Vibe tags attached by the host.
    pub vibes: Vec<String>,
    /// Broad category.
    pub event_type: EventType,
    /// Expected headcount ceiling, if declared.
    pub capacity: Option<u32>,
    /// Admission policy, if declared.
    pub age_restriction: Option<AgeRestriction>,
    /// Aggregate interaction signal; unbounded and mutated by feedback.
    pub popularity_score: f32,
    /// Trust carried by the event itself, used when host trust is unavailable.
    pub trust_score: f32,
    /// Identifier of the hosting user.
    pub host_id: String,
}

impl Event {
    /// Validate and construct an [`Event`] with empty optional fields.
    ///
    /// # Errors
    /// Returns [`EventError`] when the id, title, or host id is empty or
    /// the title is too long.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        host_id: impl Into<String>,
        event_type: EventType,
        start_time: DateTime<Utc>,
    ) -> Result<Self, EventError> {
        let id = id.into();
        let title = title.into();
        let host_id = host_id.into();
        if id.trim().is_empty() {
            return Err(EventError::MissingId);
        }
        if title.trim().is_empty() {
            return Err(EventError::MissingTitle);
        }
        let title_len = title.chars().count();
        if title_len > MAX_TITLE_LEN {
            return Err(EventError::TitleTooLong { len: title_len });
        }
        if host_id.trim().is_empty() {
            return Err(EventError::MissingHost);
        }
        Ok(Self {
            id,
            title,
            description: String::new(),
            start_time,
            end_time: None,
            location: EventLocation::default(),
            vibes: Vec::new(),
            event_type,
            capacity: None,
            age_restriction: None,
            popularity_score: 0.0,
            trust_score: 0.0,
            host_id,
        })
    }

    /// Attach a description while consuming `self`.
    ///
    /// # Errors
    /// Returns [`EventError::DescriptionTooLong`] past [`MAX_DESCRIPTION_LEN`].
    pub fn with_description(mut self, description: impl Into<String>) -> Result<Self, EventError> {
        let description = description.into();
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(EventError::DescriptionTooLong { len });
        }
        self.description = description;
        Ok(self)
    }

    /// Attach a location while consuming `self`.
    ///
    /// # Errors
    /// Returns [`EventError`] when coordinates fall outside WGS84 bounds.
    pub fn with_location(mut self, location: EventLocation) -> Result<Self, EventError> {
        if let Some(coord) = location.coord {
            if !(-90.0..=90.0).contains(&coord.y) {
                return Err(EventError::LatitudeOutOfRange { lat: coord.y });
            }
            if !(-180.0..=180.0).contains(&coord.x) {
                return Err(EventError::LongitudeOutOfRange { lng: coord.x });
            }
        }
        self.location = location;
        Ok(self)
    }

    /// Attach an end time while consuming `self`.
    ///
    /// # Errors
    /// Returns [`EventError::EndBeforeStart`] unless `end > start`.
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Result<Self, EventError> {
        if end_time <= self.start_time {
            return Err(EventError::EndBeforeStart);
        }
        self.end_time = Some(end_time);
        Ok(self)
    }

    /// Attach vibe tags while consuming `self`.
    #[must_use]
    pub fn with_vibes<I>(mut self, vibes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.vibes = vibes.into_iter().collect();
        self
    }

    /// Attach a capacity while consuming `self`.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Attach an age restriction while consuming `self`.
    #[must_use]
    pub const fn with_age_restriction(mut self, restriction: AgeRestriction) -> Self {
        self.age_restriction = Some(restriction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 20, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn constructs_with_defaults() {
        let event =
            Event::new("ev-1", "Potluck", "user-1", EventType::Food, start()).expect("valid event");
        assert!(event.vibes.is_empty());
        assert_eq!(event.popularity_score, 0.0);
        assert_eq!(event.event_type, EventType::Food);
    }

    #[rstest]
    #[case("", "Potluck", "user-1", EventError::MissingId)]
    #[case("ev-1", "  ", "user-1", EventError::MissingTitle)]
    #[case("ev-1", "Potluck", "", EventError::MissingHost)]
    fn rejects_missing_fields(
        #[case] id: &str,
        #[case] title: &str,
        #[case] host: &str,
        #[case] expected: EventError,
    ) {
        let result = Event::new(id, title, host, EventType::Food, start());
        assert_eq!(result.expect_err("invalid event"), expected);
    }

    #[rstest]
    fn rejects_oversized_title() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        let err = Event::new("ev-1", title, "user-1", EventType::Other, start())
            .expect_err("oversized title");
        assert!(matches!(err, EventError::TitleTooLong { len } if len == MAX_TITLE_LEN + 1));
    }

    #[rstest]
    fn rejects_oversized_description() {
        let event =
            Event::new("ev-1", "Potluck", "user-1", EventType::Food, start()).expect("valid event");
        let err = event
            .with_description("x".repeat(MAX_DESCRIPTION_LEN + 1))
            .expect_err("oversized description");
        assert!(matches!(err, EventError::DescriptionTooLong { .. }));
    }

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 0.0)]
    fn rejects_out_of_range_latitude(#[case] lat: f64, #[case] lng: f64) {
        let event =
            Event::new("ev-1", "Potluck", "user-1", EventType::Food, start()).expect("valid event");
        let err = event
            .with_location(EventLocation::from_lat_lng(lat, lng))
            .expect_err("invalid latitude");
        assert!(matches!(err, EventError::LatitudeOutOfRange { .. }));
    }

    #[rstest]
    #[case(0.0, 180.5)]
    #[case(0.0, -181.0)]
    fn rejects_out_of_range_longitude(#[case] lat: f64, #[case] lng: f64) {
        let event =
            Event::new("ev-1", "Potluck", "user-1", EventType::Food, start()).expect("valid event");
        let err = event
            .with_location(EventLocation::from_lat_lng(lat, lng))
            .expect_err("invalid longitude");
        assert!(matches!(err, EventError::LongitudeOutOfRange { .. }));
    }

    #[rstest]
    fn rejects_end_before_start() {
        let event =
            Event::new("ev-1", "Potluck", "user-1", EventType::Food, start()).expect("valid event");
        let err = event.with_end_time(start()).expect_err("end equals start");
        assert_eq!(err, EventError::EndBeforeStart);
    }

    #[rstest]
    #[case("party", EventType::Party)]
    #[case("WELLNESS", EventType::Wellness)]
    #[case("Outdoors", EventType::Outdoors)]
    fn parses_event_type(#[case] input: &str, #[case] expected: EventType) {
        assert_eq!(input.parse::<EventType>().expect("known type"), expected);
    }

    #[rstest]
    fn rejects_unknown_event_type() {
        let err = "seance".parse::<EventType>().expect_err("unknown type");
        assert!(matches!(err, EventError::UnknownEventType { value } if value == "seance"));
    }

    #[rstest]
    #[case("All ages", AgeRestriction::AllAges)]
    #[case("19+", AgeRestriction::NineteenPlus)]
    #[case("21+", AgeRestriction::TwentyOnePlus)]
    fn parses_age_restriction(#[case] input: &str, #[case] expected: AgeRestriction) {
        assert_eq!(
            input.parse::<AgeRestriction>().expect("known restriction"),
            expected
        );
    }
}
