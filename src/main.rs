// src/main.rs
mod auth;
mod config;
mod database;
mod datetime;
mod dtos;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod state;

use std::net::{IpAddr, SocketAddr};

use axum::{routing::get, Router};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::fmt::init as tracing_init;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();

    let config = Config::from_env().expect("Failed to load configuration");

    // Create database pool and apply schema
    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");
    database::run_migrations(&db_pool)
        .await
        .expect("Failed to run migrations");

    let host: IpAddr = config
        .host
        .parse()
        .unwrap_or_else(|_| "127.0.0.1".parse().expect("loopback address"));
    let addr = SocketAddr::from((host, config.port));

    // Create application state
    let app_state = AppState::new(db_pool, config);

    // Build application under the /api base path
    let app = Router::new()
        .nest("/api", routes::create_router(app_state.clone()))
        .route("/health", get(routes::health_check))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));
    tracing::info!("Server running on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}
