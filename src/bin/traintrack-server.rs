// ABOUTME: TrainTrack server binary wiring config, database, auth, and routes
// ABOUTME: Selects the FCM dispatcher when configured, log-only otherwise

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

//! TrainTrack server entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use traintrack::auth::AuthManager;
use traintrack::config::environment::ServerConfig;
use traintrack::context::ServerResources;
use traintrack::database::Database;
use traintrack::logging;
use traintrack::notifications::fcm::FcmClient;
use traintrack::notifications::{LogDispatcher, PushDispatcher};
use traintrack::routes;

#[derive(Parser)]
#[command(
    name = "traintrack-server",
    about = "TrainTrack fitness tracking server",
    version
)]
struct Args {
    /// HTTP port to listen on (overrides HTTP_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env().context("Failed to initialize logging")?;

    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    info!("Starting TrainTrack server: {}", config.summary());

    let database = Database::new(&config.database.url)
        .await
        .context("Failed to open database")?;

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone().into_bytes(),
        config.auth.jwt_expiry_hours,
    );

    let dispatcher: Arc<dyn PushDispatcher> = match &config.push {
        Some(push_config) => {
            let client = FcmClient::from_config(push_config, database.clone())
                .context("Failed to initialize FCM client")?;
            info!(project_id = %push_config.project_id, "FCM push delivery enabled");
            Arc::new(client)
        }
        None => {
            warn!("FCM not configured, push notifications will be logged and dropped");
            Arc::new(LogDispatcher)
        }
    };

    let resources = Arc::new(ServerResources::new(database, auth_manager, dispatcher));
    let app = routes::router(resources);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_argument_parsing() {
        let args = Args::try_parse_from(["traintrack-server", "--port", "9090"]).unwrap();
        assert_eq!(args.port, Some(9090));

        let args = Args::try_parse_from(["traintrack-server"]).unwrap();
        assert_eq!(args.port, None);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["traintrack-server", "--port", "abc"]).is_err());
        assert!(Args::try_parse_from(["traintrack-server", "--port", "70000"]).is_err());
    }
}
