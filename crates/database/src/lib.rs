use std::{env, error::Error, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use data_model::trip::TripInsertRow;
use model::{
    location::GeolocationCircle,
    statistics::{TravelledDistances, VehicleYearCounts},
    trip::Trip,
};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::watch;
use trips::{RepositoryError, Result, TripRepository};

pub mod data_model;
pub mod queries;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Option<Self> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Some(Self {
            username,
            password,
            hostname,
            port,
            database,
            max_connections,
        })
    }

    pub(self) fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

/// Lifecycle of the pool shared by all clones of a `PgTripRepository`.
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Connecting,
    Ready(PgPool),
    Failed(Arc<str>),
}

/// The trip store backed by PostgreSQL.
///
/// The pool may still be connecting while the repository is in use. Queries
/// never wait for it: they fail with `RepositoryError::ConnectionNotReady`
/// until the connection is up. Use `ready` to wait explicitly.
#[derive(Debug, Clone)]
pub struct PgTripRepository {
    state: watch::Receiver<ConnectionState>,
}

async fn establish(
    info: &DatabaseConnectionInfo,
) -> std::result::Result<PgPool, Box<dyn Error + Send + Sync>> {
    let pool = PgPoolOptions::new()
        .max_connections(info.max_connections)
        .connect(&info.postgres_url())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

impl PgTripRepository {
    /// Connects and migrates before returning.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> std::result::Result<Self, Box<dyn Error + Send + Sync>> {
        let pool = establish(&database_connection_info).await?;
        let (_, state) = watch::channel(ConnectionState::Ready(pool));
        Ok(Self { state })
    }

    /// Returns at once and connects on a background task.
    pub fn connect_in_background(database_connection_info: DatabaseConnectionInfo) -> Self {
        let (sender, state) = watch::channel(ConnectionState::Connecting);
        tokio::spawn(async move {
            let state = match establish(&database_connection_info).await {
                Ok(pool) => {
                    log::info!(
                        "connected to trip database at {}:{}.",
                        database_connection_info.hostname,
                        database_connection_info.port
                    );
                    ConnectionState::Ready(pool)
                }
                Err(why) => {
                    log::error!("could not connect to trip database: {}", why);
                    ConnectionState::Failed(why.to_string().into())
                }
            };
            // receivers keep the last state after the sender is gone
            let _ = sender.send(state);
        });
        Self { state }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Waits until connecting has finished, successfully or not.
    pub async fn ready(&self) -> Result<()> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|state| !matches!(state, ConnectionState::Connecting))
            .await
            .map(|state| state.clone())
            .map_err(RepositoryError::store_unavailable)?;
        Self::pool_of(&settled).map(|_| ())
    }

    fn pool_of(state: &ConnectionState) -> Result<PgPool> {
        match state {
            ConnectionState::Connecting => Err(RepositoryError::ConnectionNotReady),
            ConnectionState::Ready(pool) => Ok(pool.clone()),
            ConnectionState::Failed(why) => Err(RepositoryError::StoreUnavailable(
                why.to_string().into(),
            )),
        }
    }

    /// The pool if connected, without waiting.
    fn pool(&self) -> Result<PgPool> {
        Self::pool_of(&self.state.borrow())
    }

    /// Stores raw trip documents, replacing trips with the same id. Documents
    /// that can not be mapped to a trip are skipped.
    pub async fn import(&self, documents: Vec<Value>) -> Result<u64> {
        let pool = self.pool()?;
        let total = documents.len();
        let rows = documents
            .into_iter()
            .enumerate()
            .filter_map(|(index, document)| {
                TripInsertRow::from_document(document)
                    .map_err(|why| log::warn!("skipping document #{}: {}", index, why))
                    .ok()
            })
            .collect::<Vec<_>>();
        log::info!("importing {} of {} trip documents...", rows.len(), total);
        queries::trip::put_all(&pool, &rows).await
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn find_trips(
        &self,
        circle: &GeolocationCircle,
        start_after: Option<DateTime<Utc>>,
        end_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trip>> {
        let pool = self.pool()?;
        queries::trip::find_nearby(&pool, circle, start_after, end_before).await
    }

    async fn find_min_max_travelled_distances(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<Option<TravelledDistances>> {
        let pool = self.pool()?;
        queries::trip::min_max_travelled_distance(&pool, circle).await
    }

    async fn find_vehicle_model_grouped_trip_counts(
        &self,
        circle: &GeolocationCircle,
    ) -> Result<VehicleYearCounts> {
        let pool = self.pool()?;
        queries::trip::count_by_vehicle_year(&pool, circle).await
    }
}
