//! Web server for filesys.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{Config, UrlsConfig};
use crate::file::FileService;
use crate::{FilesysError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the HTTP API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Endpoint paths.
    urls: UrlsConfig,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server serving the configured storage root.
    pub fn new(config: &Config) -> Result<Self> {
        let service = FileService::from_config(config)?;
        tracing::info!("File storage initialized at: {}", config.files.root);
        Self::with_service(config, service)
    }

    /// Create a new web server over an existing file service.
    pub fn with_service(config: &Config, service: FileService) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                FilesysError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.server.host, config.server.port, e
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(service)),
            urls: config.urls.clone(),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn into_router(self) -> Router {
        create_router(self.app_state, &self.urls, &self.cors_origins)
            .merge(create_health_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0; // Use random port
        config.files.root = temp_dir.path().to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);

        let server = WebServer::new(&config).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir);
        config.server.host = "not an address".to_string();

        assert!(matches!(
            WebServer::new(&config),
            Err(FilesysError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_test_config(&temp_dir);

        let server = WebServer::new(&config).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        // Test health endpoint
        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");
    }
}
