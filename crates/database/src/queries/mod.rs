use model::location::GeolocationCircle;
use sqlx::{Postgres, QueryBuilder};
use trips::RepositoryError;
use utility::geo::EARTH_RADIUS_M;

pub mod trip;

pub(crate) fn convert_error(why: sqlx::Error) -> RepositoryError {
    RepositoryError::store_unavailable(why)
}

/// Pushes a `candidates` subquery holding the trips that started within the
/// circle, together with their `distance` in meters to the circle center.
///
/// The bounding box prunes via the start location index, the exact distance
/// is the haversine great-circle distance computed the same way as
/// `utility::geo::haversine_distance`. Callers append further conditions with
/// ` AND ...`.
pub(crate) fn push_candidates_within(
    builder: &mut QueryBuilder<'_, Postgres>,
    circle: &GeolocationCircle,
) {
    let bbox = circle.bounding_box();
    let latitude = circle.point.latitude;
    let longitude = circle.point.longitude;

    builder.push(
        "
        (
            SELECT
                id, document, start_date, complete_date, distance_travelled, year,
                (2 * ",
    );
    builder.push_bind(EARTH_RADIUS_M);
    // clamped, rounding can push the haversine term above 1
    builder.push(
        " * ASIN(LEAST(1.0, SQRT(
                    POWER(SIN((RADIANS(start_latitude) - RADIANS(",
    );
    builder.push_bind(latitude);
    builder.push(")) / 2), 2) + COS(RADIANS(");
    builder.push_bind(latitude);
    builder.push(
        ")) * COS(RADIANS(start_latitude))
                    * POWER(SIN((RADIANS(start_longitude) - RADIANS(",
    );
    builder.push_bind(longitude);
    builder.push(
        ")) / 2), 2)
                )))) AS distance
            FROM
                trips
            WHERE
                start_latitude BETWEEN ",
    );
    builder.push_bind(bbox.min_latitude);
    builder.push(" AND ");
    builder.push_bind(bbox.max_latitude);
    builder.push(" AND start_longitude BETWEEN ");
    builder.push_bind(bbox.min_longitude);
    builder.push(" AND ");
    builder.push_bind(bbox.max_longitude);
    builder.push(
        "
        ) AS candidates
        WHERE
            candidates.distance <= ",
    );
    builder.push_bind(circle.radius);
}
