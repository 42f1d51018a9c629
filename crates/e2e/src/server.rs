//! Static server for the UI assets
//!
//! Serves the UI bundle over HTTP so the page under test loads the same way it
//! would from the device. An already-running server on the port is reused
//! when allowed.

use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Configuration for the static server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory containing the UI assets
    pub static_dir: PathBuf,

    /// Port to listen on (0 = any free port)
    pub port: u16,

    /// Reuse a server already answering on the port
    pub reuse_existing: bool,

    /// How long to wait for the server to answer
    pub startup_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("data"),
            port: 8080,
            reuse_existing: std::env::var_os("CI").is_none(),
            startup_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Handle to the static server in use
pub struct ServerHandle {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Reuse a live server or start serving `static_dir`, then wait until it answers
    pub async fn start(config: ServerConfig) -> E2eResult<Self> {
        let client = health_client()?;

        if config.reuse_existing && config.port != 0 {
            let base_url = format!("http://127.0.0.1:{}", config.port);
            if is_answering(&client, &base_url).await {
                info!("Reusing server already running at {}", base_url);
                return Ok(Self {
                    base_url,
                    shutdown: None,
                    task: None,
                });
            }
        }

        if !config.static_dir.is_dir() {
            return Err(E2eError::ServerStartup(format!(
                "static directory {} does not exist",
                config.static_dir.display()
            )));
        }

        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            E2eError::ServerStartup(format!("failed to bind {}: {}", addr, e))
        })?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        info!(
            "Serving {} on {}",
            config.static_dir.display(),
            base_url
        );

        let app = Router::new()
            .fallback_service(ServeDir::new(&config.static_dir))
            .layer(TraceLayer::new_for_http());
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                warn!("Static server stopped with error: {}", e);
            }
        });

        let handle = Self {
            base_url,
            shutdown: Some(tx),
            task: Some(task),
        };

        handle.wait_for_healthy(&client, config.startup_timeout()).await?;

        info!("Server is healthy at {}", handle.base_url);
        Ok(handle)
    }

    /// Wait for the server to respond to health checks
    async fn wait_for_healthy(
        &self,
        client: &reqwest::Client,
        timeout_duration: Duration,
    ) -> E2eResult<()> {
        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;
            if is_answering(client, &self.base_url).await {
                return Ok(());
            }
            if attempts == 1 {
                info!("Waiting for server to start...");
            }
            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when this handle owns the server rather than reusing one
    pub fn is_owned(&self) -> bool {
        self.task.is_some()
    }

    /// Stop the server and wait for it to drain
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn health_client() -> E2eResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?)
}

/// One GET against the server root
async fn is_answering(client: &reqwest::Client, base_url: &str) -> bool {
    match client.get(base_url).send().await {
        Ok(resp) if resp.status().is_success() => true,
        Ok(resp) => {
            warn!("Health check returned {}", resp.status());
            false
        }
        // Connection refused is expected while the server is starting
        Err(e) => {
            if !e.is_connect() {
                warn!("Health check error: {}", e);
            }
            false
        }
    }
}
