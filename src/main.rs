use log::{error, info};
use std::net::TcpListener;
use warp::Filter;

use instalite::config::Config;
use instalite::db;
use instalite::routes::build_routes;
use instalite::warp_helpers::{cors, handle_rejection};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let port = config.port;

    info!("Starting InstaLite server on Port {}", port);
    info!("Database: {}", config.db_path);
    info!("Upload path: {}", config.upload_path);

    // Check if port is available BEFORE initializing services
    if !is_port_available(port) {
        error!(
            "Port {} is already in use. Please stop any existing InstaLite instances or use a different port.",
            port
        );
        return Err(format!("Port {} is already in use", port).into());
    }

    let db_pool = db::create_db_pool(&config.db_path)?;
    info!("Database initialized successfully");

    std::fs::create_dir_all(&config.upload_path)?;

    let routes = build_routes(db_pool, config)
        .with(cors())
        .with(warp::log("instalite"))
        .recover(handle_rejection);

    info!(
        "Server started successfully, listening on http://localhost:{}",
        port
    );

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

fn is_port_available(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}
