use chrono::{DateTime, Utc};
use model::{
    location::GeolocationCircle,
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};
use indexmap::IndexMap;
use sqlx::{types::Json, Executor, PgPool, Postgres, QueryBuilder};
use trips::Result;
use utility::let_also::LetAlso;

use crate::data_model::{to_models, trip::TripInsertRow, trip::TripRow};

use super::{convert_error, push_candidates_within};

const MAX_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

pub(crate) fn find_nearby_query(
    circle: &GeolocationCircle,
    start_after: Option<DateTime<Utc>>,
    end_before: Option<DateTime<Utc>>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT candidates.id, candidates.document FROM ");
    push_candidates_within(&mut builder, circle);
    if let Some(start_after) = start_after {
        builder.push(" AND candidates.start_date >= ");
        builder.push_bind(start_after);
    }
    if let Some(end_before) = end_before {
        builder.push(" AND candidates.complete_date <= ");
        builder.push_bind(end_before);
    }
    builder.push(" ORDER BY candidates.distance ASC;");
    builder
}

pub(crate) fn extremal_distance_query(
    circle: &GeolocationCircle,
    order: SortOrder,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT candidates.distance_travelled FROM ");
    push_candidates_within(&mut builder, circle);
    builder.push(" AND candidates.distance_travelled IS NOT NULL");
    builder.push(" ORDER BY candidates.distance_travelled ");
    builder.push(order.sql());
    builder.push(" LIMIT 1;");
    builder
}

pub(crate) fn count_by_year_query(
    circle: &GeolocationCircle,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT candidates.year, COUNT(*) AS count FROM ");
    push_candidates_within(&mut builder, circle);
    builder.push(" GROUP BY candidates.year;");
    builder
}

/// Trips started within the circle, nearest first.
pub async fn find_nearby<'c, E>(
    executor: E,
    circle: &GeolocationCircle,
    start_after: Option<DateTime<Utc>>,
    end_before: Option<DateTime<Utc>>,
) -> Result<Vec<Trip>>
where
    E: Executor<'c, Database = Postgres>,
{
    find_nearby_query(circle, start_after, end_before)
        .build_query_as::<TripRow>()
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|rows: Vec<TripRow>| Ok(to_models(rows)?))
}

async fn extremal_distance<'c, E>(
    executor: E,
    circle: &GeolocationCircle,
    order: SortOrder,
) -> Result<Option<f64>>
where
    E: Executor<'c, Database = Postgres>,
{
    extremal_distance_query(circle, order)
        .build_query_scalar::<f64>()
        .fetch_optional(executor)
        .await
        .map_err(convert_error)
}

/// Runs one single row query per extreme instead of scanning all matches.
pub async fn min_max_travelled_distance<'c, E>(
    executor: E,
    circle: &GeolocationCircle,
) -> Result<Option<TravelledDistances>>
where
    E: Executor<'c, Database = Postgres> + Copy,
{
    let (min, max) = tokio::try_join!(
        extremal_distance(executor, circle, SortOrder::Ascending),
        extremal_distance(executor, circle, SortOrder::Descending),
    )?;
    Ok(match (min, max) {
        (Some(min), Some(max)) => Some(TravelledDistances { min, max }),
        _ => None,
    })
}

pub async fn count_by_vehicle_year<'c, E>(
    executor: E,
    circle: &GeolocationCircle,
) -> Result<VehicleYearCounts>
where
    E: Executor<'c, Database = Postgres>,
{
    count_by_year_query(circle)
        .build_query_as::<(Option<i32>, i64)>()
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .into_iter()
        .map(|(year, count)| (year, count.max(0) as u64))
        .collect::<VehicleYearCounts>()
        .let_owned(Ok)
}

/// Keeps the last row per id, at the position of the first. A single
/// `ON CONFLICT DO UPDATE` statement must not touch the same row twice.
pub(crate) fn unique_by_id(rows: &[TripInsertRow]) -> Vec<&TripInsertRow> {
    rows.iter()
        .map(|row| (row.id.as_str(), row))
        .collect::<IndexMap<_, _>>()
        .into_values()
        .collect()
}

/// Inserts or replaces trips by id, all or nothing. Returns the number of
/// distinct trips written.
pub async fn put_all(pool: &PgPool, rows: &[TripInsertRow]) -> Result<u64> {
    let rows = unique_by_id(rows);
    let mut transaction = pool.begin().await.map_err(convert_error)?;
    let mut written = 0;
    for chunk in rows.chunks(MAX_CHUNK_SIZE) {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO trips (
                id, document, start_longitude, start_latitude, end_longitude,
                end_latitude, start_date, complete_date, distance_travelled, year
            ) ",
        );
        builder.push_values(chunk, |mut values, row| {
            values
                .push_bind(row.id.clone())
                .push_bind(Json(row.document.clone()))
                .push_bind(row.start_longitude)
                .push_bind(row.start_latitude)
                .push_bind(row.end_longitude)
                .push_bind(row.end_latitude)
                .push_bind(row.start_date)
                .push_bind(row.complete_date)
                .push_bind(row.distance_travelled)
                .push_bind(row.year);
        });
        builder.push(
            "
            ON CONFLICT (id)
            DO UPDATE SET
                document = EXCLUDED.document,
                start_longitude = EXCLUDED.start_longitude,
                start_latitude = EXCLUDED.start_latitude,
                end_longitude = EXCLUDED.end_longitude,
                end_latitude = EXCLUDED.end_latitude,
                start_date = EXCLUDED.start_date,
                complete_date = EXCLUDED.complete_date,
                distance_travelled = EXCLUDED.distance_travelled,
                year = EXCLUDED.year;
            ",
        );
        written += builder
            .build()
            .execute(&mut *transaction)
            .await
            .map_err(convert_error)?
            .rows_affected();
    }
    transaction.commit().await.map_err(convert_error)?;
    Ok(written)
}
