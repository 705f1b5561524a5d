use chrono::{DateTime, TimeZone as _, Utc};
use model::{
    location::GeolocationPoint,
    trip::{Trip, Vehicle, WeatherConditions},
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::{prelude::FromRow, types::Json};
use trips::MappingError;
use utility::{
    id::Id,
    serde::{date_time, lenient},
};
use uuid::Uuid;

use super::DatabaseRow;

/// A trip record in its stored shape. Field names follow the source feed:
/// snake case operational fields, upper case weather fields and GeoJSON points.
///
/// Every field is optional and degrades to `None` when it has an unexpected
/// type. Only `to_model` decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDocument {
    #[serde(rename = "_id", default, deserialize_with = "lenient::deserialize")]
    pub id: Option<StoredId>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub distance_travelled: Option<f64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub driver_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub rider_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_zip_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end_zip_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub charity_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub requested_car_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub free_credit_used: Option<i64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub surge_factor: Option<f64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub rating: Option<f64>,
    #[serde(rename = "Date", default, deserialize_with = "lenient::deserialize")]
    pub date: Option<String>,
    #[serde(rename = "PRCP", default, deserialize_with = "lenient::deserialize")]
    pub prcp: Option<f64>,
    #[serde(rename = "TMAX", default, deserialize_with = "lenient::deserialize")]
    pub tmax: Option<f64>,
    #[serde(rename = "TMIN", default, deserialize_with = "lenient::deserialize")]
    pub tmin: Option<f64>,
    #[serde(rename = "AWND", default, deserialize_with = "lenient::deserialize")]
    pub awnd: Option<f64>,
    #[serde(rename = "GustSpeed2", default, deserialize_with = "lenient::deserialize")]
    pub gust_speed2: Option<f64>,
    #[serde(rename = "Fog", default, deserialize_with = "lenient::integer")]
    pub fog: Option<i64>,
    #[serde(rename = "HeavyFog", default, deserialize_with = "lenient::integer")]
    pub heavy_fog: Option<i64>,
    #[serde(rename = "Thunder", default, deserialize_with = "lenient::integer")]
    pub thunder: Option<i64>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub start: Option<GeoJsonPoint>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub end: Option<GeoJsonPoint>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub start_date: Option<StoredTimestamp>,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub complete_date: Option<StoredTimestamp>,
}

/// `{ "type": "Point", "coordinates": [longitude, latitude] }`
#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonPoint {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl GeoJsonPoint {
    fn to_point(&self) -> Option<GeolocationPoint> {
        GeolocationPoint::from_coordinates(&self.coordinates)
    }
}

/// Identifiers arrive as plain strings, numbers or exported object ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredId {
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
    Number(i64),
}

impl StoredId {
    pub fn to_id_string(&self) -> String {
        match self {
            Self::ObjectId { oid } => oid.clone(),
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Timestamps arrive as ISO-8601 text, epoch milliseconds or in the exported
/// `{"$date": ..}` form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    Text(String),
    Millis(i64),
    Extended {
        #[serde(rename = "$date")]
        date: Box<StoredTimestamp>,
    },
    NumberLong {
        #[serde(rename = "$numberLong")]
        value: String,
    },
}

impl StoredTimestamp {
    pub fn to_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(text) => date_time::parse_utc(text).ok(),
            Self::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            Self::Extended { date } => date.to_date_time(),
            Self::NumberLong { value } => value
                .parse::<i64>()
                .ok()
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        }
    }
}

impl TripDocument {
    /// Reads a stored record. Anything that is not an object reads as an empty
    /// document, which then fails to map.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    pub fn to_model(self) -> Result<Trip, MappingError> {
        let start = self
            .start
            .as_ref()
            .ok_or(MappingError::MissingField("start"))?
            .to_point()
            .ok_or(MappingError::InvalidCoordinates("start"))?;
        let start_date_time = self
            .start_date
            .as_ref()
            .and_then(StoredTimestamp::to_date_time)
            .ok_or(MappingError::MissingField("start_date"))?;

        let id = self
            .id
            .as_ref()
            .map(StoredId::to_id_string)
            .unwrap_or_default();
        let weather = WeatherConditions {
            awnd: self.awnd,
            gust_speed2: self.gust_speed2,
            fog: self.fog,
            heavy_fog: self.heavy_fog,
            thunder: self.thunder,
        };

        Ok(Trip {
            id: Id::new(id),
            start,
            end: self.end.as_ref().and_then(GeoJsonPoint::to_point),
            distance_travelled: self.distance_travelled,
            start_date_time,
            end_date_time: self
                .complete_date
                .as_ref()
                .and_then(StoredTimestamp::to_date_time),
            vehicle: Vehicle {
                year: self.year,
                color: self.color,
                make: self.make,
                model: self.model,
                surge_factor: self.surge_factor,
            },
            driver_rating: self.driver_rating,
            rider_rating: self.rider_rating,
            start_zip_code: self.start_zip_code,
            end_zip_code: self.end_zip_code,
            charity_id: self.charity_id,
            requested_car_category: self.requested_car_category,
            free_credit_used: self.free_credit_used,
            rating: self.rating,
            date: self.date,
            prcp: self.prcp,
            t_max: self.tmax,
            t_min: self.tmin,
            weather: (!weather.is_empty()).then_some(weather),
        })
    }
}

/// Table: `trips`
#[derive(Debug, Clone, FromRow)]
pub struct TripRow {
    pub id: String,
    pub document: Json<Value>,
}

impl DatabaseRow for TripRow {
    type Model = Trip;

    fn to_model(self) -> Result<Trip, MappingError> {
        let mut trip = TripDocument::from_value(&self.document.0).to_model()?;
        trip.id = Id::new(self.id);
        Ok(trip)
    }
}

/// A stored record together with the projections the trips table is searched by.
#[derive(Debug, Clone)]
pub struct TripInsertRow {
    pub id: String,
    pub document: Value,
    pub start_longitude: f64,
    pub start_latitude: f64,
    pub end_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub start_date: DateTime<Utc>,
    pub complete_date: Option<DateTime<Utc>>,
    pub distance_travelled: Option<f64>,
    pub year: Option<i32>,
}

impl TripInsertRow {
    /// Documents without an identifier get a random one.
    pub fn from_document(document: Value) -> Result<Self, MappingError> {
        let trip = TripDocument::from_value(&document).to_model()?;
        let id = if trip.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            trip.id.raw()
        };
        Ok(Self {
            id,
            document,
            start_longitude: trip.start.longitude,
            start_latitude: trip.start.latitude,
            end_longitude: trip.end.map(|end| end.longitude),
            end_latitude: trip.end.map(|end| end.latitude),
            start_date: trip.start_date_time,
            complete_date: trip.end_date_time,
            distance_travelled: trip.distance_travelled,
            year: trip.vehicle.year,
        })
    }
}
