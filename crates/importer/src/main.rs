use std::{env, process::ExitCode};

use database::{DatabaseConnectionInfo, PgTripRepository};
use serde_json::Value;

/// Reads exported trip documents, either as one JSON array or as one
/// document per line.
fn parse_documents(content: &str) -> Result<Vec<Value>, serde_json::Error> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content);
    }
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let paths = env::args().skip(1).collect::<Vec<_>>();
    if paths.is_empty() {
        log::error!("usage: importer <trips.json | trips.jsonl>...");
        return ExitCode::FAILURE;
    }

    let Some(database_connection_info) = DatabaseConnectionInfo::from_env() else {
        log::error!("expected database connection info in env.");
        return ExitCode::FAILURE;
    };
    let repository = match PgTripRepository::connect(database_connection_info).await {
        Ok(repository) => repository,
        Err(why) => {
            log::error!("could not connect to database: {}", why);
            return ExitCode::FAILURE;
        }
    };

    let mut imported = 0;
    for path in paths {
        let documents = match tokio::fs::read_to_string(&path)
            .await
            .map_err(|why| why.to_string())
            .and_then(|content| parse_documents(&content).map_err(|why| why.to_string()))
        {
            Ok(documents) => documents,
            Err(why) => {
                log::error!("could not read '{}': {}", path, why);
                return ExitCode::FAILURE;
            }
        };

        match repository.import(documents).await {
            Ok(count) => {
                log::info!("stored {} trips from '{}'.", count, path);
                imported += count;
            }
            Err(why) => {
                log::error!("could not import '{}': {}", path, why);
                return ExitCode::FAILURE;
            }
        }
    }

    log::info!("done, {} trips stored.", imported);
    ExitCode::SUCCESS
}
