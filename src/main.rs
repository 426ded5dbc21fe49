use migration::{Migrator, MigratorTrait};
use tokio::signal;

use game_reviews_api::app;
use game_reviews_api::config::Config;
use game_reviews_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize structured logging
    app::init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting Game Reviews API"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = game_reviews_api::db::connect(&config.database_url).await?;
    tracing::info!("Database connected");

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations applied");
    } else {
        tracing::info!("Skipping migrations (RUN_MIGRATIONS=false)");
    }

    let addr = config.socket_addr();
    let router = app::build(AppState {
        db: db.clone(),
        config,
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    tracing::info!("Database connection closed");

    Ok(())
}

/// Resolve on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
