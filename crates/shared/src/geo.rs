//! Geographic primitives.
//!
//! Two coordinate spaces exist in Prospect: WGS-84 degrees ([`GeoPoint`])
//! and the Web Mercator plane in meters ([`ProjectedPoint`]). They are
//! distinct types so the compiler rejects accidental mixing; crossing the
//! boundary always goes through [`project`] / [`unproject`].

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers (spherical model, haversine).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude.
pub const KM_PER_DEG_LAT: f64 = 111.32;

/// WGS-84 equatorial radius in meters (Web Mercator sphere).
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Full width of the Web Mercator plane in meters.
pub const MERCATOR_EXTENT_M: f64 = 2.0 * std::f64::consts::PI * MERCATOR_RADIUS_M;

/// Latitude limit of the Web Mercator projection.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// A WGS-84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether the point lies inside the valid WGS-84 ranges.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A position on the Web Mercator plane, in meters.
///
/// Opaque to everything except the projection functions and the camera;
/// never compare against a [`GeoPoint`] without projecting first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Kilometers per degree of longitude at the given latitude.
pub fn km_per_deg_lon(lat: f64) -> f64 {
    KM_PER_DEG_LAT * lat.to_radians().cos()
}

/// Great-circle distance between two points in kilometers (haversine).
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Forward Web Mercator projection. Latitude is clamped to the projection
/// limit so poles cannot produce infinities.
pub fn project(p: GeoPoint) -> ProjectedPoint {
    let lat = p.lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = MERCATOR_RADIUS_M * p.lon.to_radians();
    let y = MERCATOR_RADIUS_M
        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
            .tan()
            .ln();
    ProjectedPoint { x, y }
}

/// Inverse Web Mercator projection.
pub fn unproject(p: ProjectedPoint) -> GeoPoint {
    let lon = (p.x / MERCATOR_RADIUS_M).to_degrees();
    let lat =
        (2.0 * (p.y / MERCATOR_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    GeoPoint { lon, lat }
}

/// An axis-aligned lat/lon rectangle. Field names match the backend wire
/// format, so the type serializes directly into requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Smallest box enclosing all points of a ring.
    pub fn from_ring(ring: &[GeoPoint]) -> Self {
        let mut bbox = BoundingBox {
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
        };
        for p in ring {
            bbox.lat_min = bbox.lat_min.min(p.lat);
            bbox.lat_max = bbox.lat_max.max(p.lat);
            bbox.lon_min = bbox.lon_min.min(p.lon);
            bbox.lon_max = bbox.lon_max.max(p.lon);
        }
        bbox
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lon: (self.lon_min + self.lon_max) / 2.0,
            lat: (self.lat_min + self.lat_max) / 2.0,
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.lat_min && p.lat <= self.lat_max && p.lon >= self.lon_min && p.lon <= self.lon_max
    }

    /// East-west extent in kilometers, measured along the box's mid latitude.
    pub fn width_km(&self) -> f64 {
        let mid = (self.lat_min + self.lat_max) / 2.0;
        distance_km(
            GeoPoint::new(self.lon_min, mid),
            GeoPoint::new(self.lon_max, mid),
        )
    }

    /// North-south extent in kilometers.
    pub fn height_km(&self) -> f64 {
        let mid = (self.lon_min + self.lon_max) / 2.0;
        distance_km(
            GeoPoint::new(mid, self.lat_min),
            GeoPoint::new(mid, self.lat_max),
        )
    }

    pub fn area_km2(&self) -> f64 {
        self.width_km() * self.height_km()
    }
}
