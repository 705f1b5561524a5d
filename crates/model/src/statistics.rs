use std::collections::BTreeMap;

use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{de::Error as _, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use crate::ExampleData;

/// Extremal travelled distances of the trips started within a search circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TravelledDistances {
    pub min: f64,
    pub max: f64,
}

impl TravelledDistances {
    /// Folds a distance into the running extremes.
    pub fn include(self, distance: f64) -> Self {
        Self {
            min: self.min.min(distance),
            max: self.max.max(distance),
        }
    }

    pub fn from_distances<I: IntoIterator<Item = f64>>(distances: I) -> Option<Self> {
        distances.into_iter().fold(None, |acc, distance| {
            Some(match acc {
                Some(acc) => Self::include(acc, distance),
                None => Self {
                    min: distance,
                    max: distance,
                },
            })
        })
    }
}

impl ExampleData for TravelledDistances {
    fn example_data() -> Self {
        Self {
            min: 512.0,
            max: 23_150.0,
        }
    }
}

/// Trip counts keyed by vehicle model year. Trips without a known year are
/// counted under `None`, which is written as the key `"null"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleYearCounts(pub BTreeMap<Option<i32>, u64>);

const UNKNOWN_YEAR_KEY: &str = "null";

impl VehicleYearCounts {
    pub fn add(&mut self, year: Option<i32>, count: u64) {
        *self.0.entry(year).or_default() += count;
    }

    pub fn get(&self, year: Option<i32>) -> Option<u64> {
        self.0.get(&year).copied()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Option<i32>, u64)> for VehicleYearCounts {
    fn from_iter<I: IntoIterator<Item = (Option<i32>, u64)>>(iter: I) -> Self {
        let mut counts = Self::default();
        for (year, count) in iter {
            counts.add(year, count);
        }
        counts
    }
}

impl Serialize for VehicleYearCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (year, count) in &self.0 {
            match year {
                Some(year) => map.serialize_entry(&year.to_string(), count)?,
                None => map.serialize_entry(UNKNOWN_YEAR_KEY, count)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VehicleYearCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, u64>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, count)| match key.as_str() {
                UNKNOWN_YEAR_KEY => Ok((None, count)),
                _ => key
                    .parse::<i32>()
                    .map(|year| (Some(year), count))
                    .map_err(|_| D::Error::custom(format!("'{}' is not a year", key))),
            })
            .collect()
    }
}

impl JsonSchema for VehicleYearCounts {
    fn schema_name() -> String {
        "VehicleYearCounts".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        BTreeMap::<String, u64>::json_schema(gen)
    }
}

impl ExampleData for VehicleYearCounts {
    fn example_data() -> Self {
        [(Some(2014), 3), (Some(2016), 12), (Some(2017), 5), (None, 1)]
            .into_iter()
            .collect()
    }
}
