use database::{DatabaseConnectionInfo, PgTripRepository};
use trips::TripService;
use web::{config::WebConfig, start_web_server, WebState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .expect("expected database connection info in env.");
    let repository = PgTripRepository::connect_in_background(database_connection_info);

    // web server
    let web_config = WebConfig::from_env().expect("could not read web config.");
    let web_future = start_web_server(
        WebState {
            trip_service: TripService::new(repository),
        },
        web_config.bind_address,
    );

    if let Err(why) = web_future.await {
        log::error!("web server stopped: {}", why);
    }
}
