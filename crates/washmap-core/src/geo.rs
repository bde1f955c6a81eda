//! Geographic primitives shared by the gateway and the interaction layer.
//!
//! Coordinates are WGS84. The map side of the house thinks lat-first; GeoJSON
//! payloads are lng-first. [`LatLng`] keeps the two named so call sites never
//! have to remember which position is which.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometres, as used by the service for all
/// approximate distance math.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Builds a coordinate pair, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] when `lat` is outside `[-90, 90]` or `lng` is
    /// outside `[-180, 180]` (NaN fails both checks).
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// `[lng, lat]` position in GeoJSON coordinate order.
    #[must_use]
    pub fn to_geojson_position(self) -> Vec<f64> {
        vec![self.lng, self.lat]
    }

    /// Latitude formatted for query strings, six decimal places.
    #[must_use]
    pub fn lat_param(self) -> String {
        format!("{:.6}", self.lat)
    }

    /// Longitude formatted for query strings, six decimal places.
    #[must_use]
    pub fn lng_param(self) -> String {
        format!("{:.6}", self.lng)
    }
}

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
