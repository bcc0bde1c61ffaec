use std::fmt::{Display, Formatter};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::geo::LatLng;
use crate::scan::radius_for_zoom;

/// Decimal places kept on request coordinates.
const COORDINATE_PRECISION: u32 = 6;

/// Parameters of a single zone scan as they go out on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanRequest {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
}

impl ScanRequest {
    /// Builds the request for a viewport center and zoom level.
    ///
    /// Coordinates are rounded to six decimal places, midpoints away from
    /// zero, so repeated builds for the same viewport are identical.
    pub fn from_viewport(center: LatLng, zoom: f64) -> Self {
        Self {
            lat: round_coordinate(center.lat),
            lng: round_coordinate(center.lng),
            radius: radius_for_zoom(zoom),
        }
    }
}

impl Display for ScanRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{lat:.6}, {lng:.6} ({radius} m)",
            lat = self.lat,
            lng = self.lng,
            radius = self.radius
        )
    }
}

fn round_coordinate(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|v| {
            v.round_dp_with_strategy(COORDINATE_PRECISION, RoundingStrategy::MidpointAwayFromZero)
        })
        .and_then(|v| v.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_coordinates_round_to_six_decimals() {
        let request = ScanRequest::from_viewport(LatLng::new(36.5234567, -5.9812345678), 10.0);

        assert_eq!(request.lat, 36.523457);
        assert_eq!(request.lng, -5.981235);
        assert_eq!(request.radius, 5_000);
    }

    #[test]
    fn test_short_coordinates_pass_through() {
        let request = ScanRequest::from_viewport(LatLng::new(36.52, -5.98), 8.0);

        assert_eq!(request.lat, 36.52);
        assert_eq!(request.lng, -5.98);
        assert_eq!(request.radius, 10_000);
    }

    #[test]
    fn test_building_is_deterministic() {
        let center = LatLng::new(36.5234567, -5.9876543);
        let first = ScanRequest::from_viewport(center, 12.3);
        let second = ScanRequest::from_viewport(center, 12.3);

        assert_eq!(first, second);
        assert_eq!(first.lat.to_bits(), second.lat.to_bits());
        assert_eq!(first.lng.to_bits(), second.lng.to_bits());
    }

    #[test]
    fn test_display_renders_wire_precision() {
        let request = ScanRequest::from_viewport(LatLng::new(36.52, -5.98), 10.0);

        assert_eq!(format!("{request}"), "36.520000, -5.980000 (5000 m)");
    }
}
