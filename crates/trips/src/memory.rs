use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    location::GeolocationCircle,
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};

use crate::repository::{Result, TripRepository};

/// A `TripRepository` over a fixed set of trips held in memory. Answers the
/// same questions as the database backed repository and stands in for it
/// wherever no store is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryTripRepository {
    trips: Vec<Trip>,
}

impl MemoryTripRepository {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    /// Trips started within the circle, paired with their distance to its center.
    fn within<'a>(
        &'a self,
        circle: &'a GeolocationCircle,
    ) -> impl Iterator<Item = (f64, &'a Trip)> + 'a {
        self.trips
            .iter()
            .map(|trip| (circle.point.distance_to(&trip.start), trip))
            .filter(|(distance, _)| *distance <= circle.radius)
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn find_trips(
        &self,
        circle: &GeolocationCircle,
        start_after: Option<DateTime<Utc>>,
        end_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trip>> {
        let mut matches = self
            .within(circle)
            .filter(|(_, trip)| {
                start_after.map_or(true, |bound| trip.start_date_time >= bound)
            })
            .filter(|(_, trip)| {
                end_before.map_or(true, |bound| {
                    trip.end_date_time.is_some_and(|end| end <= bound)
                })
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(matches.into_iter().map(|(_, trip)| trip.clone()).collect())
    }

    async fn find_min_max_travelled_distances(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<Option<TravelledDistances>> {
        Ok(TravelledDistances::from_distances(
            self.within(circle)
                .filter_map(|(_, trip)| trip.distance_travelled),
        ))
    }

    async fn find_vehicle_model_grouped_trip_counts(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<VehicleYearCounts> {
        Ok(self
            .within(circle)
            .map(|(_, trip)| (trip.vehicle.year, 1))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use model::{location::GeolocationPoint, trip::Vehicle};
    use utility::id::Id;

    use super::*;

    fn trip(id: &str, latitude: f64, year: Option<i32>) -> Trip {
        Trip::new(
            Id::new(id.to_owned()),
            GeolocationPoint::new(-97.70929823, latitude),
            Utc.with_ymd_and_hms(2016, 10, 1, 8, 0, 0).unwrap(),
            Vehicle {
                year,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn trips_without_year_are_counted_apart() {
        let repository = MemoryTripRepository::new(vec![
            trip("with-year", 31.04685111, Some(2016)),
            trip("without-year", 31.05, None),
        ]);
        let circle =
            GeolocationCircle::new(GeolocationPoint::new(-97.70929823, 31.04685111), 15_000.0);

        let counts = repository
            .find_vehicle_model_grouped_trip_counts(&circle)
            .await
            .unwrap();
        let in_circle = repository.find_trips(&circle, None, None).await.unwrap();

        assert_eq!(in_circle.len(), 2);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.get(Some(2016)), Some(1));
        assert_eq!(counts.get(None), Some(1));
    }
}
