use tracing::{error, info};

use filesys::{Config, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = filesys::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filesys::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    info!("filesys - file and folder manager");
    info!(
        "Server configured on {}:{}, storage root {}",
        config.server.host, config.server.port, config.files.root
    );

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start web server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        std::process::exit(1);
    }
}
