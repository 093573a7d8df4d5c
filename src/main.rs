//! LAN Share Server - Entry Point
//!
//! Serves a web page for uploading, listing, downloading and deleting files in
//! a shared directory, reachable from every device on the local network.

use log::{error, info};
use std::process::ExitCode;

use lan_share_server::{Server, ShareConfig, utils::logging::setup_logging};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config = match ShareConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching LAN share server...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped with error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
