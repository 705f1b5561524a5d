use std::{error, fmt, result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    location::GeolocationCircle,
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};

/// A stored record could not be turned into a `Trip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    MissingField(&'static str),
    InvalidCoordinates(&'static str),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => {
                write!(f, "stored trip is missing the required field '{}'", field)
            }
            Self::InvalidCoordinates(field) => write!(
                f,
                "stored trip has no [longitude, latitude] coordinates in '{}'",
                field
            ),
        }
    }
}

impl error::Error for MappingError {}

#[derive(Debug)]
pub enum RepositoryError {
    /// The store connection is still being set up.
    ConnectionNotReady,
    /// The store could not be reached or failed executing a query.
    StoreUnavailable(Box<dyn error::Error + Send + Sync>),
    Mapping(MappingError),
}

impl RepositoryError {
    pub fn store_unavailable<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::StoreUnavailable(Box::new(why))
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionNotReady => {
                write!(f, "the trip store connection is not ready yet")
            }
            Self::StoreUnavailable(why) => write!(f, "the trip store failed: {}", why),
            Self::Mapping(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::ConnectionNotReady => None,
            Self::StoreUnavailable(why) => Some(why.as_ref()),
            Self::Mapping(why) => Some(why),
        }
    }
}

impl From<MappingError> for RepositoryError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

pub type Result<T> = result::Result<T, RepositoryError>;

/// Read access to the stored trips. All searches are restricted to trips that
/// started within the given circle.
///
/// Implementations never retry. A store that is not usable yet must fail with
/// `RepositoryError::ConnectionNotReady` rather than return an empty result.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Trips ordered nearest-first by start point. `start_after` bounds the start
    /// time, `end_before` the completion time, both inclusive. A trip without a
    /// completion time never matches an `end_before` bound.
    async fn find_trips(
        &self,
        circle: &GeolocationCircle,
        start_after: Option<DateTime<Utc>>,
        end_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trip>>;

    /// `None` if no trip with a travelled distance started within the circle.
    async fn find_min_max_travelled_distances(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<Option<TravelledDistances>>;

    /// Trip counts grouped by vehicle model year. Trips without a year are
    /// counted under `None`, so the counts add up to the trips in the circle.
    async fn find_vehicle_model_grouped_trip_counts(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<VehicleYearCounts>;
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn mapping_errors_name_the_field() {
        let why = RepositoryError::from(MappingError::MissingField("start_date"));
        assert!(why.to_string().contains("start_date"));
        assert!(why.source().is_some());
    }

    #[test]
    fn not_ready_has_no_source() {
        assert!(RepositoryError::ConnectionNotReady.source().is_none());
    }
}
