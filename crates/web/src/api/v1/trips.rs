use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Json, Router,
};
use chrono::{DateTime, Utc};
use model::{
    location::{GeolocationCircle, GeolocationPoint},
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};
use serde::Deserialize;
use utility::{let_also::LetAlso, serde::date_time};

use crate::{
    common::{
        route_not_found, schema, JsonResult, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(get_trips))
        .route("/schema", get(schema::<Trip>))
        .route("/distances", get(get_min_max_travelled_distances))
        .route("/distances/schema", get(schema::<TravelledDistances>))
        .route(
            "/reports/vehiclemodelstats",
            get(get_vehicle_model_grouped_trip_counts),
        )
        .route(
            "/reports/vehiclemodelstats/schema",
            get(schema::<VehicleYearCounts>),
        )
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// `lat`/`long` in degrees, `rad` in kilometres.
#[derive(Debug, Deserialize)]
pub(crate) struct AreaQuery {
    lat: f64,
    long: f64,
    rad: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TripsQuery {
    lat: f64,
    long: f64,
    rad: f64,

    #[serde(deserialize_with = "date_time::deserialize_utc_option", default)]
    start: Option<DateTime<Utc>>,

    #[serde(deserialize_with = "date_time::deserialize_utc_option", default)]
    end: Option<DateTime<Utc>>,
}

fn search_circle(latitude: f64, longitude: f64, radius_km: f64) -> RouteResult<GeolocationCircle> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(RouteErrorResponse::bad_request(
            "'lat' must be a latitude between -90 and 90.",
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(RouteErrorResponse::bad_request(
            "'long' must be a longitude between -180 and 180.",
        ));
    }
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(RouteErrorResponse::bad_request(
            "'rad' must be a non-negative number of kilometres.",
        ));
    }
    Ok(GeolocationCircle::from_kilometers(
        GeolocationPoint::new(longitude, latitude),
        radius_km,
    ))
}

/// Unwraps the query or turns the rejection into a 400 for `original_uri`.
fn parse_query<T>(
    query: Result<Query<T>, QueryRejection>,
    original_uri: &OriginalUri,
) -> RouteResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|why| with_request(RouteErrorResponse::from(why), original_uri))
}

fn with_request(response: RouteErrorResponse, original_uri: &OriginalUri) -> RouteErrorResponse {
    response
        .with_method(&Method::GET)
        .with_uri(original_uri.0.path())
}

impl AreaQuery {
    fn circle(&self) -> RouteResult<GeolocationCircle> {
        search_circle(self.lat, self.long, self.rad)
    }
}

impl TripsQuery {
    fn circle(&self) -> RouteResult<GeolocationCircle> {
        search_circle(self.lat, self.long, self.rad)
    }
}

async fn get_trips(
    original_uri: OriginalUri,
    State(WebState { trip_service, .. }): State<WebState>,
    query: Result<Query<TripsQuery>, QueryRejection>,
) -> JsonResult<Vec<Trip>> {
    let params = parse_query(query, &original_uri)?;
    let circle = params
        .circle()
        .map_err(|why| with_request(why, &original_uri))?;

    trip_service
        .get_trips(&circle, params.start, params.end)
        .await
        .map(Json)
        .map_err(|why| with_request(RouteErrorResponse::from(why), &original_uri))
}

async fn get_min_max_travelled_distances(
    original_uri: OriginalUri,
    State(WebState { trip_service, .. }): State<WebState>,
    query: Result<Query<AreaQuery>, QueryRejection>,
) -> JsonResult<TravelledDistances> {
    let circle = parse_query(query, &original_uri)?
        .circle()
        .map_err(|why| with_request(why, &original_uri))?;

    trip_service
        .get_min_max_travelled_distances(&circle)
        .await
        .map_err(|why| with_request(RouteErrorResponse::from(why), &original_uri))?
        .map(Json)
        .ok_or_else(|| {
            RouteErrorResponse::new(StatusCode::NOT_FOUND)
                .with_message("No trip with a travelled distance starts in the requested area.")
                .let_owned(|response| with_request(response, &original_uri))
        })
}

async fn get_vehicle_model_grouped_trip_counts(
    original_uri: OriginalUri,
    State(WebState { trip_service, .. }): State<WebState>,
    query: Result<Query<AreaQuery>, QueryRejection>,
) -> JsonResult<VehicleYearCounts> {
    let circle = parse_query(query, &original_uri)?
        .circle()
        .map_err(|why| with_request(why, &original_uri))?;

    trip_service
        .get_vehicle_model_grouped_trip_counts(&circle)
        .await
        .map(Json)
        .map_err(|why| with_request(RouteErrorResponse::from(why), &original_uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_given_in_kilometres() {
        let circle = search_circle(31.0, -97.7, 2.5).unwrap();
        assert_eq!(circle.radius, 2500.0);
        assert_eq!(circle.point, GeolocationPoint::new(-97.7, 31.0));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(search_circle(90.0, 180.0, 0.0).is_ok());
        assert!(search_circle(-90.0, -180.0, 0.0).is_ok());
    }

    #[test]
    fn out_of_range_parameters_are_bad_requests() {
        for (lat, long, rad) in [
            (90.5, 0.0, 1.0),
            (0.0, -180.5, 1.0),
            (0.0, 0.0, -1.0),
            (0.0, 0.0, f64::INFINITY),
            (f64::NAN, 0.0, 1.0),
        ] {
            let error = search_circle(lat, long, rad).unwrap_err();
            assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        }
    }
}
