use std::sync::Arc;

use chrono::{DateTime, Utc};
use model::{
    location::GeolocationCircle,
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};

use crate::repository::{Result, TripRepository};

/// Entry point for callers that need trips. It only forwards to the injected
/// repository, so callers never depend on the storage technology.
#[derive(Clone)]
pub struct TripService {
    repository: Arc<dyn TripRepository>,
}

impl TripService {
    pub fn new<R: TripRepository + 'static>(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_shared(repository: Arc<dyn TripRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_trips(
        &self,
        circle: &GeolocationCircle,
        start_after: Option<DateTime<Utc>>,
        end_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trip>> {
        log::debug!(
            "get trips around {:?} within {} m",
            circle.point,
            circle.radius
        );
        self.repository
            .find_trips(circle, start_after, end_before)
            .await
    }

    pub async fn get_min_max_travelled_distances(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<Option<TravelledDistances>> {
        log::debug!(
            "get travelled distances around {:?} within {} m",
            circle.point,
            circle.radius
        );
        self.repository
            .find_min_max_travelled_distances(circle)
            .await
    }

    pub async fn get_vehicle_model_grouped_trip_counts(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<VehicleYearCounts> {
        log::debug!(
            "get trip counts per vehicle year around {:?} within {} m",
            circle.point,
            circle.radius
        );
        self.repository
            .find_vehicle_model_grouped_trip_counts(circle)
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use model::{location::GeolocationPoint, trip::Vehicle};
    use utility::id::Id;

    use super::*;
    use crate::{memory::MemoryTripRepository, RepositoryError};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 10, day, hour, 0, 0).unwrap()
    }

    fn trip(
        id: &str,
        longitude: f64,
        latitude: f64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        distance: Option<f64>,
        year: Option<i32>,
    ) -> Trip {
        let mut trip = Trip::new(
            Id::new(id.to_owned()),
            GeolocationPoint::new(longitude, latitude),
            start,
            Vehicle {
                year,
                ..Default::default()
            },
        );
        trip.end_date_time = end;
        trip.distance_travelled = distance;
        trip
    }

    fn fixtures() -> Vec<Trip> {
        vec![
            trip("far", -97.74, 30.27, at(1, 9), Some(at(1, 10)), Some(99_999.0), Some(2016)),
            trip("north", -97.70929823, 31.15, at(2, 0), Some(at(2, 1)), Some(1200.0), Some(2015)),
            trip("center", -97.70929823, 31.04685111, at(1, 8), Some(at(1, 9)), Some(6598.0), Some(2016)),
            trip("no-distance", -97.72, 31.05, at(3, 0), None, None, None),
        ]
    }

    fn service() -> TripService {
        TripService::new(MemoryTripRepository::new(fixtures()))
    }

    fn circle() -> GeolocationCircle {
        GeolocationCircle::new(GeolocationPoint::new(-97.70929823, 31.04685111), 15_000.0)
    }

    fn ids(trips: &[Trip]) -> Vec<String> {
        trips.iter().map(|trip| trip.id.raw()).collect()
    }

    #[tokio::test]
    async fn trips_are_within_circle_and_nearest_first() {
        let circle = circle();
        let trips = service().get_trips(&circle, None, None).await.unwrap();
        assert_eq!(ids(&trips), vec!["center", "no-distance", "north"]);
        assert!(trips.iter().all(|trip| circle.contains(&trip.start)));
    }

    #[tokio::test]
    async fn start_after_is_inclusive() {
        let trips = service()
            .get_trips(&circle(), Some(at(2, 0)), None)
            .await
            .unwrap();
        assert_eq!(ids(&trips), vec!["no-distance", "north"]);
    }

    #[tokio::test]
    async fn end_before_excludes_trips_without_completion() {
        let trips = service()
            .get_trips(&circle(), None, Some(at(1, 9)))
            .await
            .unwrap();
        assert_eq!(ids(&trips), vec!["center"]);
    }

    #[tokio::test]
    async fn min_max_distances_of_circle() {
        let distances = service()
            .get_min_max_travelled_distances(&circle())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(distances.min, 1200.0);
        assert_eq!(distances.max, 6598.0);
        assert!(distances.min <= distances.max);
    }

    #[tokio::test]
    async fn counts_per_model_year() {
        let counts = service()
            .get_vehicle_model_grouped_trip_counts(&circle())
            .await
            .unwrap();
        assert_eq!(counts.get(Some(2016)), Some(1));
        assert_eq!(counts.get(Some(2015)), Some(1));
        assert_eq!(counts.get(None), Some(1));
        // every trip in the circle is counted once
        let in_circle = service().get_trips(&circle(), None, None).await.unwrap();
        assert_eq!(counts.total(), in_circle.len() as u64);
    }

    #[tokio::test]
    async fn empty_circle_has_no_data() {
        // gulf of mexico
        let circle = GeolocationCircle::new(GeolocationPoint::new(-90.0, 25.0), 1000.0);
        let service = service();
        assert!(service.get_trips(&circle, None, None).await.unwrap().is_empty());
        assert_eq!(
            service.get_min_max_travelled_distances(&circle).await.unwrap(),
            None
        );
        assert!(service
            .get_vehicle_model_grouped_trip_counts(&circle)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn repeated_calls_return_identical_results() {
        let service = service();
        let circle = circle();
        assert_eq!(
            service.get_trips(&circle, None, None).await.unwrap(),
            service.get_trips(&circle, None, None).await.unwrap()
        );
        assert_eq!(
            service.get_vehicle_model_grouped_trip_counts(&circle).await.unwrap(),
            service.get_vehicle_model_grouped_trip_counts(&circle).await.unwrap()
        );
    }

    struct NotReadyRepository;

    #[async_trait]
    impl TripRepository for NotReadyRepository {
        async fn find_trips(
            &self,
            _circle: &GeolocationCircle,
            _start_after: Option<DateTime<Utc>>,
            _end_before: Option<DateTime<Utc>>,
        ) -> Result<Vec<Trip>> {
            Err(RepositoryError::ConnectionNotReady)
        }

        async fn find_min_max_travelled_distances(
            &self,
            _circle: &GeolocationCircle,
        ) -> Result<Option<TravelledDistances>> {
            Err(RepositoryError::ConnectionNotReady)
        }

        async fn find_vehicle_model_grouped_trip_counts(
            &self,
            _circle: &GeolocationCircle,
        ) -> Result<VehicleYearCounts> {
            Err(RepositoryError::ConnectionNotReady)
        }
    }

    #[tokio::test]
    async fn repository_errors_are_passed_through() {
        let service = TripService::new(NotReadyRepository);
        let circle = circle();
        assert!(matches!(
            service.get_trips(&circle, None, None).await,
            Err(RepositoryError::ConnectionNotReady)
        ));
        assert!(matches!(
            service.get_min_max_travelled_distances(&circle).await,
            Err(RepositoryError::ConnectionNotReady)
        ));
        assert!(matches!(
            service.get_vehicle_model_grouped_trip_counts(&circle).await,
            Err(RepositoryError::ConnectionNotReady)
        ));
    }
}
