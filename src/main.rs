//! PKM Backend
//!
//! A REST backend for a personal knowledge management application, with
//! SQLite persistence and session-token authentication.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PKM Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that require a valid session. The list routes interpret the
    // {id} segment as an owner id, the write routes as a row id.
    let protected_routes = Router::new()
        // Items
        .route("/items/{id}", get(api::list_items))
        .route("/items", post(api::create_item))
        .route("/items/{id}", put(api::update_item))
        .route("/items/{id}", delete(api::delete_item))
        .route("/items/search/{id}", get(api::search_items))
        // Tags
        .route("/tags/{id}", get(api::list_tags))
        .route("/tags", post(api::create_tag))
        .route("/tags/{id}", put(api::update_tag))
        .route("/tags/{id}", delete(api::delete_tag))
        // Todos
        .route("/todos/{id}", get(api::list_todos))
        .route("/todos", post(api::create_todo))
        .route("/todos/{id}", put(api::update_todo))
        .route("/todos/{id}", delete(api::delete_todo))
        // Users
        .route("/users", get(api::list_users))
        .route("/users/{id}", delete(api::delete_user))
        // Products
        .route("/products", get(api::list_products))
        .route("/products", post(api::create_product))
        .route("/products/{id}", get(api::get_product))
        .route("/products/{id}", put(api::update_product))
        .route("/products/{id}", delete(api::delete_product))
        // Sessions
        .route("/auth/logout", post(api::logout))
        // Apply session auth middleware
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_auth_layer,
        ));

    // Signup and login do not require a session
    let open_routes = Router::new()
        .route("/users", post(api::create_user))
        .route("/auth/login", post(api::login));

    let api_routes = protected_routes.merge(open_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
