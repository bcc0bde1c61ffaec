use serde::{Deserialize, Serialize};

/// Number of ring points used to approximate the scan circle.
const RING_POINTS: u32 = 12;
/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Viewport bounding box in west/south/east/north order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Builds the WKT polygon OBIS expects for a circular scan area.
///
/// Coordinates are emitted in longitude-latitude order with six decimal
/// places; the ring is closed by repeating the first point. Degree offsets
/// shrink with latitude along the east-west axis.
pub fn circle_polygon_wkt(center: LatLng, radius_m: u32) -> String {
    let radius = f64::from(radius_m);
    let radius_deg_lat = radius / METERS_PER_DEGREE;
    let radius_deg_lng = radius / (METERS_PER_DEGREE * center.lat.to_radians().cos());

    let ring = (0..=RING_POINTS)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * f64::from(i) / f64::from(RING_POINTS);
            let lat = center.lat + radius_deg_lat * angle.cos();
            let lng = center.lng + radius_deg_lng * angle.sin();
            format!("{lng:.6} {lat:.6}")
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("POLYGON(({ring}))")
}
