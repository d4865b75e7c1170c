//! Great-circle distance between event and requester coordinates.
//!
//! Coordinates are WGS84 `geo::Coord` values with `x = longitude` and
//! `y = latitude` in degrees. Either endpoint may be unknown; the result
//! is then `None` rather than an error, and callers treat the candidate
//! as not locatable.

use geo::Coord;

/// Mean Earth radius in kilometres used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Compute the haversine distance in kilometres between two coordinates.
///
/// Returns `None` when either endpoint is absent. Never errors: radius
/// filters must exclude `None` results while unfiltered listings keep
/// them.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use blockparty_core::haversine_km;
///
/// let origin = Some(Coord { x: 0.0, y: 0.0 });
/// assert_eq!(haversine_km(origin, origin), Some(0.0));
/// assert_eq!(haversine_km(origin, None), None);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "great-circle distance is floating-point trigonometry"
)]
pub fn haversine_km(from: Option<Coord<f64>>, to: Option<Coord<f64>>) -> Option<f64> {
    let from = from?;
    let to = to?;

    let lat_from = from.y.to_radians();
    let lat_to = to.y.to_radians();
    let d_lat = (to.y - from.y).to_radians();
    let d_lng = (to.x - from.x).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Some(EARTH_RADIUS_KM * c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TORONTO: Coord<f64> = Coord {
        x: -79.3832,
        y: 43.6532,
    };
    const MONTREAL: Coord<f64> = Coord {
        x: -73.5674,
        y: 45.5019,
    };

    #[rstest]
    fn identical_coordinates_are_zero_km() {
        assert_eq!(haversine_km(Some(TORONTO), Some(TORONTO)), Some(0.0));
    }

    #[rstest]
    fn distance_is_symmetric() {
        let forward = haversine_km(Some(TORONTO), Some(MONTREAL)).expect("both endpoints known");
        let back = haversine_km(Some(MONTREAL), Some(TORONTO)).expect("both endpoints known");
        assert!((forward - back).abs() < 1e-9);
    }

    #[rstest]
    fn toronto_to_montreal_is_about_five_hundred_km() {
        let km = haversine_km(Some(TORONTO), Some(MONTREAL)).expect("both endpoints known");
        assert!((km - 504.0).abs() < 5.0, "got {km} km");
    }

    #[rstest]
    #[case(None, Some(TORONTO))]
    #[case(Some(TORONTO), None)]
    #[case(None, None)]
    fn unknown_endpoint_yields_none(
        #[case] from: Option<Coord<f64>>,
        #[case] to: Option<Coord<f64>>,
    ) {
        assert_eq!(haversine_km(from, to), None);
    }
}
