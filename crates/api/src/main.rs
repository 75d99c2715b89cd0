use std::net::SocketAddr;
use std::sync::Arc;

use footprint_events::{EmailConfig, EmailDelivery, EmailNotifier, LogNotifier, Notifier};
use footprint_quotes::{PaystackClient, PgQuoteStore, QuoteService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use footprint_api::config::ServerConfig;
use footprint_api::router::build_app_router;
use footprint_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "footprint_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        custom_orders_enabled = config.custom_orders_enabled,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = footprint_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    footprint_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    footprint_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Email ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(host = %email.smtp_host, "SMTP email delivery enabled");
            Arc::new(EmailNotifier::new(EmailDelivery::new(email)))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Payment gateway ---
    if config.paystack_secret_key.is_none() {
        tracing::warn!("PAYSTACK_SECRET_KEY not set, custom quote checkout is unavailable");
    }
    let gateway = PaystackClient::new(&config.paystack_base_url, config.paystack_secret_key.clone())
        .expect("Failed to build Paystack client");

    // --- App state ---
    let quotes = QuoteService::new(
        Arc::new(PgQuoteStore::new(pool.clone())),
        Arc::clone(&notifier),
        Arc::new(gateway),
        config.service_config(),
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        quotes,
        notifier,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
