use migration::{ Migrator, MigratorTrait };
use sea_orm::ConnectOptions;
use std::sync::Arc;
use subly_vault::{ AppError, Config, Result };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "subly_vault=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!("Starting subly-vault against Privacy Cash at {}", config.privacy_cash_api_url);

    // Initialize database connection
    let mut options = ConnectOptions::new(config.database_url.clone());
    if config.database_url.starts_with("sqlite::memory:") {
        // Each pooled SQLite connection would get its own in-memory database
        options.max_connections(1);
    }
    let db = sea_orm::Database::connect(options).await.map_err(AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    Migrator::up(&db, None).await.map_err(AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // External collaborators
    let privacy_cash = Arc::new(
        subly_vault::providers::PrivacyCashClient::new(
            &config.privacy_cash_api_url,
            config.http_timeout
        )?
    );
    let store: Arc<dyn subly_vault::db::TransferStore> = Arc::new(
        subly_vault::db::TransferRepository::new(db)
    );
    let clock: Arc<dyn subly_vault::clock::Clock> = Arc::new(subly_vault::clock::SystemClock);

    // Initialize services
    let transfer_service = Arc::new(
        subly_vault::services::TransferService::new(store.clone(), clock.clone())
    );

    let execution_service = Arc::new(
        subly_vault::services::ExecutionService::new(
            store,
            privacy_cash.clone(),
            privacy_cash,
            clock,
            config.payment_timeout
        )
    );

    // Create app state
    let app_state = subly_vault::api::AppState::new(transfer_service, execution_service);

    // Build application router
    let app = subly_vault::api
        ::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.bind_address();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
