//! Libris Server - Library Catalog System
//!
//! A Rust REST API server for library catalog management.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{
    api,
    clock::SystemClock,
    config::AppConfig,
    repository::Repository,
    services::{sms::SmsNotifier, sweeper::Sweeper, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository, collaborators and services
    let repository = Repository::postgres(pool);
    let notifier = Arc::new(SmsNotifier::new(config.sms.clone()));
    let clock = Arc::new(SystemClock);
    let services = Services::new(
        repository.clone(),
        config.auth.clone(),
        &config.policy,
        notifier.clone(),
        clock.clone(),
    );

    // Start the reminder and retention sweeps
    Arc::new(Sweeper::new(
        repository,
        notifier,
        clock,
        &config.policy,
    ))
    .spawn();

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication and recovery
        .route("/auth/register", post(api::users::register))
        .route("/auth/login", post(api::users::login))
        .route("/auth/admin/login", post(api::users::admin_login))
        .route("/auth/me", get(api::users::me))
        .route("/auth/validate", get(api::users::validate_token))
        .route("/auth/forgot-password", post(api::users::forgot_password))
        .route("/auth/verify-otp", post(api::users::verify_otp))
        .route("/auth/reset-password", post(api::users::reset_password))
        // Users
        .route("/users/by-mobile", get(api::users::get_user_by_mobile))
        .route("/users/admin-exists", get(api::users::admin_exists))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/available", get(api::books::list_available))
        .route("/books/categories", get(api::books::list_categories))
        .route(
            "/books/category/:category",
            get(api::books::list_available_by_category),
        )
        .route("/books/count", get(api::books::count_books))
        .route("/books/count/available", get(api::books::count_available))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        // Borrows
        .route(
            "/borrows/user/:user_id/book/:book_id",
            post(api::borrows::borrow_book),
        )
        .route("/borrows/user/:user_id", get(api::borrows::get_user_loans))
        .route("/borrows/:id/return", put(api::borrows::return_book))
        .route("/borrows/count", get(api::borrows::count_borrowed))
        .route("/borrows/:id/fine", get(api::borrows::get_fine))
        .route(
            "/borrows/user/:user_id/can-borrow",
            get(api::borrows::can_borrow),
        )
        .route(
            "/borrows/user/:user_id/fine-status",
            get(api::borrows::fine_status),
        )
        .route(
            "/borrows/user/:user_id/book/:book_id/already-borrowed",
            get(api::borrows::already_borrowed),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
