//! Classify event start times relative to an injected evaluation time.
//!
//! The evaluation timestamp is always a parameter, never read from the
//! system clock, so bucketing stays pure and testable. All arithmetic is
//! on the UTC calendar day of the evaluation time.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Time-window filter a caller may attach to a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WhenFilter {
    /// Starting within the next two hours.
    Now,
    /// This evening, 17:00 through end of day.
    Tonight,
    /// The coming Saturday and Sunday.
    Weekend,
    /// Anything further out; maps to the month-long store window.
    Later,
}

impl WhenFilter {
    /// Return the filter as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Tonight => "tonight",
            Self::Weekend => "weekend",
            Self::Later => "later",
        }
    }
}

impl std::fmt::Display for WhenFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WhenFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "now" => Ok(Self::Now),
            "tonight" => Ok(Self::Tonight),
            "weekend" => Ok(Self::Weekend),
            "later" => Ok(Self::Later),
            _ => Err(format!("unknown when filter '{s}'")),
        }
    }
}

/// Urgency bucket assigned to an event start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeBucket {
    /// Starts within two hours of evaluation.
    Now,
    /// Starts between 17:00 and 23:59:59 of the evaluation day.
    Tonight,
    /// Starts within the coming Saturday–Sunday.
    Weekend,
    /// Everything else.
    Later,
}

/// An inclusive start/end pair used for store range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    /// Earliest start time admitted by the window.
    pub start: DateTime<Utc>,
    /// Latest start time admitted by the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Whether a moment falls inside the window, boundaries included.
    #[must_use]
    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        moment >= self.start && moment <= self.end
    }
}

/// Classify an event start time into a [`TimeBucket`].
///
/// Returns `None` when the caller supplied no [`WhenFilter`]: requests
/// without a time preference skip bucketing entirely. Buckets are checked
/// in urgency order, so an event at 18:00 evaluated at 17:00 is `Now`
/// rather than `Tonight`.
///
/// # Examples
/// ```
/// use blockparty_core::{TimeBucket, WhenFilter, bucket_start_time};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).single().unwrap();
/// let soon = now + Duration::minutes(90);
/// assert_eq!(
///     bucket_start_time(soon, Some(WhenFilter::Now), now),
///     Some(TimeBucket::Now),
/// );
/// assert_eq!(bucket_start_time(soon, None, now), None);
/// ```
#[must_use]
pub fn bucket_start_time(
    start: DateTime<Utc>,
    when_filter: Option<WhenFilter>,
    now: DateTime<Utc>,
) -> Option<TimeBucket> {
    when_filter?;

    let lead = start - now;
    if lead >= Duration::zero() && lead <= Duration::hours(2) {
        return Some(TimeBucket::Now);
    }

    let today = day_start(now);
    if start >= today + Duration::hours(17) && start < today + Duration::days(1) {
        return Some(TimeBucket::Tonight);
    }

    let weekend = weekend_window(now);
    if weekend.contains(start) {
        return Some(TimeBucket::Weekend);
    }

    Some(TimeBucket::Later)
}

/// Build the store range filter for a [`WhenFilter`].
///
/// Windows deliberately overlap: "now" sits inside "tonight" on an
/// evening, and [`WhenFilter::Later`] maps to a thirty-day window.
#[must_use]
pub fn time_window(when: WhenFilter, now: DateTime<Utc>) -> TimeWindow {
    match when {
        WhenFilter::Now => TimeWindow {
            start: now,
            end: now + Duration::hours(2),
        },
        WhenFilter::Tonight => TimeWindow {
            start: now,
            end: end_of_day(now),
        },
        WhenFilter::Weekend => weekend_window(now),
        WhenFilter::Later => TimeWindow {
            start: now,
            end: now + Duration::days(30),
        },
    }
}

/// Midnight at the start of the moment's UTC day.
fn day_start(moment: DateTime<Utc>) -> DateTime<Utc> {
    let seconds = i64::from(moment.time().num_seconds_from_midnight());
    // Leap-second nanos are folded into the final second of the day.
    let nanos = i64::from(moment.time().nanosecond().min(999_999_999));
    moment - Duration::seconds(seconds) - Duration::nanoseconds(nanos)
}

/// 23:59:59 of the moment's UTC day.
fn end_of_day(moment: DateTime<Utc>) -> DateTime<Utc> {
    day_start(moment) + Duration::days(1) - Duration::seconds(1)
}

/// Saturday 00:00:00 through Sunday 23:59:59 of the coming weekend.
///
/// Uses days-until-Saturday arithmetic: zero when the moment is already a
/// Saturday, so Sunday rolls forward to the following weekend.
fn weekend_window(now: DateTime<Utc>) -> TimeWindow {
    let from_monday = i64::from(now.weekday().num_days_from_monday());
    let until_saturday = (5 - from_monday).rem_euclid(7);
    let saturday = day_start(now) + Duration::days(until_saturday);
    TimeWindow {
        start: saturday,
        end: saturday + Duration::days(2) - Duration::seconds(1),
    }
}
