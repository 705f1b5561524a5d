use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{location::GeolocationPoint, ExampleData};

/// A completed ride. Only the start location and start time are guaranteed,
/// everything else comes from a sparse feed and may be missing.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Id<Trip>,
    pub start: GeolocationPoint,
    pub end: Option<GeolocationPoint>,
    pub distance_travelled: Option<f64>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub vehicle: Vehicle,
    pub driver_rating: Option<f64>,
    pub rider_rating: Option<f64>,
    pub start_zip_code: Option<String>,
    pub end_zip_code: Option<String>,
    pub charity_id: Option<i64>,
    pub requested_car_category: Option<String>,
    pub free_credit_used: Option<i64>,
    pub rating: Option<f64>,
    /// display date as delivered with the weather data
    pub date: Option<String>,
    /// precipitation
    pub prcp: Option<f64>,
    pub t_max: Option<f64>,
    pub t_min: Option<f64>,
    pub weather: Option<WeatherConditions>,
}

impl HasId for Trip {
    type IdType = String;
}

impl Trip {
    /// A trip with only the required fields set.
    pub fn new(
        id: Id<Trip>,
        start: GeolocationPoint,
        start_date_time: DateTime<Utc>,
        vehicle: Vehicle,
    ) -> Self {
        Self {
            id,
            start,
            end: None,
            distance_travelled: None,
            start_date_time,
            end_date_time: None,
            vehicle,
            driver_rating: None,
            rider_rating: None,
            start_zip_code: None,
            end_zip_code: None,
            charity_id: None,
            requested_car_category: None,
            free_credit_used: None,
            rating: None,
            date: None,
            prcp: None,
            t_max: None,
            t_min: None,
            weather: None,
        }
    }
}

impl ExampleData for Trip {
    fn example_data() -> Self {
        Self {
            id: Id::new("5a4b2c1d9e8f7a6b5c4d3e2f".to_owned()),
            start: GeolocationPoint::new(-97.70929823, 31.04685111),
            end: Some(GeolocationPoint::new(-97.75024414, 30.99841309)),
            distance_travelled: Some(6598.0),
            start_date_time: Utc.with_ymd_and_hms(2016, 10, 1, 8, 16, 40).unwrap(),
            end_date_time: Some(Utc.with_ymd_and_hms(2016, 10, 1, 8, 31, 20).unwrap()),
            vehicle: Vehicle {
                year: Some(2016),
                color: Some("White".to_owned()),
                make: Some("Toyota".to_owned()),
                model: Some("Prius".to_owned()),
                surge_factor: Some(1.0),
            },
            driver_rating: Some(5.0),
            rider_rating: None,
            start_zip_code: Some("76542".to_owned()),
            end_zip_code: Some("76543".to_owned()),
            charity_id: None,
            requested_car_category: Some("REGULAR".to_owned()),
            free_credit_used: Some(0),
            rating: Some(5.0),
            date: Some("2016-10-01".to_owned()),
            prcp: Some(0.0),
            t_max: Some(91.0),
            t_min: Some(70.0),
            weather: Some(WeatherConditions {
                awnd: Some(6.49),
                gust_speed2: Some(14.1),
                fog: Some(0),
                heavy_fog: Some(0),
                thunder: Some(0),
            }),
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub year: Option<i32>,
    pub color: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub surge_factor: Option<f64>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    /// average wind speed
    pub awnd: Option<f64>,
    pub gust_speed2: Option<f64>,
    pub fog: Option<i64>,
    pub heavy_fog: Option<i64>,
    pub thunder: Option<i64>,
}

impl WeatherConditions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let trip = Trip::new(
            Id::new("a".to_owned()),
            GeolocationPoint::new(1.0, 2.0),
            Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap(),
            Vehicle::default(),
        );
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "a",
                "start": { "longitude": 1.0, "latitude": 2.0 },
                "startDateTime": "2016-06-01T00:00:00Z",
                "vehicle": {}
            })
        );
    }

    #[test]
    fn uses_camel_case_names() {
        let json = serde_json::to_value(Trip::example_data()).unwrap();
        assert_eq!(json["distanceTravelled"], 6598.0);
        assert_eq!(json["tMax"], 91.0);
        assert_eq!(json["vehicle"]["surgeFactor"], 1.0);
        assert_eq!(json["weather"]["gustSpeed2"], 14.1);
        assert_eq!(json["weather"]["heavyFog"], 0);
    }

    #[test]
    fn weather_without_values_is_empty() {
        assert!(WeatherConditions::default().is_empty());
        assert!(!WeatherConditions {
            thunder: Some(1),
            ..Default::default()
        }
        .is_empty());
    }
}
