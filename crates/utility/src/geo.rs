/// Mean earth radius used for all great-circle computations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// An axis aligned box in degrees, used to prune candidates before the exact
/// distance is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

/// Smallest box containing every point within `radius_m` meters of the center.
/// The longitude range falls back to [-180, 180] when the circle reaches a pole
/// or crosses the antimeridian.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_m: f64) -> BoundingBox {
    let lat_rad = to_radians(lat);
    let angular_radius = radius_m / EARTH_RADIUS_M;

    // Latitude bounds
    let min_lat = to_degrees(lat_rad - angular_radius).max(-90.0);
    let max_lat = to_degrees(lat_rad + angular_radius).min(90.0);

    let full_longitude = BoundingBox {
        min_latitude: min_lat,
        min_longitude: -180.0,
        max_latitude: max_lat,
        max_longitude: 180.0,
    };
    if min_lat <= -90.0 || max_lat >= 90.0 {
        return full_longitude;
    }

    // Longitude bounds (adjusted by latitude)
    let ratio = angular_radius.sin() / lat_rad.cos();
    if ratio >= 1.0 {
        return full_longitude;
    }
    let delta_lon = to_degrees(ratio.asin());
    let min_lon = lon - delta_lon;
    let max_lon = lon + delta_lon;
    if min_lon < -180.0 || max_lon > 180.0 {
        return full_longitude;
    }

    BoundingBox {
        min_latitude: min_lat,
        min_longitude: min_lon,
        max_latitude: max_lat,
        max_longitude: max_lon,
    }
}

/// Great-circle distance in meters.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // same form as the database distance
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let d = haversine_distance(31.04685111, -97.70929823, 31.04685111, -97.70929823);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_distance(30.2672, -97.7431, 31.0468, -97.7093);
        let b = haversine_distance(31.0468, -97.7093, 30.2672, -97.7431);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn bounding_box_contains_circle_edge() {
        let (lat, lon, radius) = (31.04685111, -97.70929823, 15_000.0);
        let bbox = calculate_bounding_box(lat, lon, radius);
        // walk the circle edge in 10 degree steps
        for step in 0..36 {
            let bearing = to_radians(step as f64 * 10.0);
            let angular = radius / EARTH_RADIUS_M;
            let lat1 = to_radians(lat);
            let lat2 = (lat1.sin() * angular.cos()
                + lat1.cos() * angular.sin() * bearing.cos())
            .asin();
            let lon2 = to_radians(lon)
                + (bearing.sin() * angular.sin() * lat1.cos())
                    .atan2(angular.cos() - lat1.sin() * lat2.sin());
            let (lat2, lon2) = (to_degrees(lat2), to_degrees(lon2));
            assert!(
                lat2 >= bbox.min_latitude - 1e-9
                    && lat2 <= bbox.max_latitude + 1e-9
                    && lon2 >= bbox.min_longitude - 1e-9
                    && lon2 <= bbox.max_longitude + 1e-9,
                "edge point at bearing {} outside {:?}",
                step * 10,
                bbox
            );
        }
    }

    #[test]
    fn bounding_box_near_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(89.99, 10.0, 5_000.0);
        assert_eq!(bbox.min_longitude, -180.0);
        assert_eq!(bbox.max_longitude, 180.0);
        assert_eq!(bbox.max_latitude, 90.0);
    }

    #[test]
    fn bounding_box_across_antimeridian_spans_all_longitudes() {
        let bbox = calculate_bounding_box(0.0, 179.99, 10_000.0);
        assert_eq!(bbox.min_longitude, -180.0);
        assert_eq!(bbox.max_longitude, 180.0);
    }

    #[test]
    fn zero_radius_box_is_the_point() {
        let bbox = calculate_bounding_box(10.0, 20.0, 0.0);
        assert!(bbox.contains(10.0, 20.0));
        assert!(!bbox.contains(10.001, 20.0));
    }
}
