use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo::{self, BoundingBox};

use crate::ExampleData;

/// A position on earth. Longitude always comes first, matching the GeoJSON
/// coordinate order the trips are stored with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeolocationPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeolocationPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Builds a point from GeoJSON style `[longitude, latitude, ..]` coordinates.
    pub fn from_coordinates(coordinates: &[f64]) -> Option<Self> {
        match coordinates {
            [longitude, latitude, ..] => Some(Self::new(*longitude, *latitude)),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeolocationPoint) -> f64 {
        geo::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// A search region. Only ever used as a query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeolocationCircle {
    pub point: GeolocationPoint,
    /// radius in meters
    pub radius: f64,
}

impl GeolocationCircle {
    pub fn new(point: GeolocationPoint, radius: f64) -> Self {
        Self { point, radius }
    }

    pub fn from_kilometers(point: GeolocationPoint, radius_km: f64) -> Self {
        Self::new(point, radius_km * 1000.0)
    }

    pub fn contains(&self, point: &GeolocationPoint) -> bool {
        self.point.distance_to(point) <= self.radius
    }

    pub fn bounding_box(&self) -> BoundingBox {
        geo::calculate_bounding_box(self.point.latitude, self.point.longitude, self.radius)
    }
}

impl ExampleData for GeolocationCircle {
    fn example_data() -> Self {
        Self::new(GeolocationPoint::new(-97.70929823, 31.04685111), 15_000.0)
    }
}
