use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ShareConfig;
use crate::middleware::logging::log_request;
use crate::protocol;
use crate::server::state::AppState;

/// Build the router serving the four share endpoints
pub fn router(state: Arc<AppState>) -> Router {
    // Room for the whole form, not just the file; the exact file ceiling is
    // enforced while writing.
    let body_limit = usize::try_from(state.policy.max_request_bytes()).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(protocol::index))
        .route("/upload", post(protocol::upload))
        .route("/download/{filename}", get(protocol::download))
        .route("/delete/{filename}", post(protocol::delete))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(log_request))
        .with_state(state)
}

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Open the storage root and bind the listening socket
    pub async fn new(config: ShareConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Arc::new(config);
        let state = Arc::new(AppState::new(Arc::clone(&config)).await?);

        let socket = config.bind_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until Ctrl-C
    pub async fn start(self) -> std::io::Result<()> {
        let config = &self.state.config;
        let local_ip = &self.state.local_ip;

        info!("LAN file share server started");
        info!("Local IP: {}", local_ip);
        info!(
            "Open http://{}:{} from any device on the same network",
            local_ip, config.server_port
        );
        info!(
            "Sharing {} (max upload {} MB)",
            self.state.store.root().display(),
            config.max_file_size_mb
        );

        let app = router(Arc::clone(&self.state));
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, finishing open requests"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
