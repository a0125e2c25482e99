use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use swipe_match::auth::JwtVerifier;
use swipe_match::config::Settings;
use swipe_match::core::{MatchResolver, SwipeEngine};
use swipe_match::routes::{self, AppState};
use swipe_match::services::{CatalogClient, HttpScorer, InMemorySwipeStore, PostgresClient, SwipeStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn startup_error(what: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", what, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", what, err))
}

/// Periodically retry swipes whose scoring was deferred
fn spawn_reconciler(resolver: MatchResolver, interval_secs: u64, batch_size: usize) {
    info!("Reconciling pending swipes every {}s (batch of {})", interval_secs, batch_size);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = resolver.reconcile_pending(batch_size).await {
                error!("Reconciliation sweep failed: {}", e);
            }
        }
    });
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; LOG_LEVEL and LOG_FORMAT are folded into `logging`
    // Logging is not up yet; main reports the returned error
    let settings = Settings::load().map_err(|e| {
        io::Error::new(io::ErrorKind::Other, format!("Failed to load configuration: {}", e))
    })?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting swipe-match service...");
    info!("Configuration loaded successfully");


    // Initialize the swipe store
    let store: Arc<dyn SwipeStore> = if settings.database.is_memory() {
        info!("Using in-memory swipe store; data is lost on restart");
        Arc::new(InMemorySwipeStore::new())
    } else {
        let db_max_conn = settings.database.max_connections.unwrap_or(10);
        let postgres = PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

        info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);
        Arc::new(postgres)
    };

    // Initialize external collaborators
    let catalog = Arc::new(
        CatalogClient::new(
            settings.catalog.base_url.clone(),
            settings.catalog.api_key.clone(),
            Duration::from_secs(settings.catalog.timeout_secs),
        )
        .map_err(|e| startup_error("Failed to create catalog client", e))?,
    );

    info!("Catalog client initialized ({})", settings.catalog.base_url);

    let scorer = Arc::new(
        HttpScorer::new(
            settings.scorer.url.clone(),
            Duration::from_millis(settings.scorer.timeout_ms),
        )
        .map_err(|e| startup_error("Failed to create scorer client", e))?,
    );

    info!(
        "Compatibility scorer at {} (timeout: {}ms)",
        settings.scorer.url, settings.scorer.timeout_ms
    );

    let engine = SwipeEngine::new(
        store,
        catalog.clone(),
        catalog,
        scorer,
        settings.matching.threshold,
    );

    info!("Swipe engine initialized with match threshold {}", settings.matching.threshold);

    if let Some(interval) = settings.matching.reconcile_interval_secs.filter(|secs| *secs > 0) {
        spawn_reconciler(
            engine.resolver.clone(),
            interval,
            settings.matching.reconcile_batch_size,
        );
    }

    // Build application state
    let app_state = AppState { engine };
    let verifier = JwtVerifier::new(&settings.auth.jwt_secret);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(verifier.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
