use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usergen::account::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};
use usergen::auth::{TokenConfig, CREATE_ACCOUNTS};
use usergen::catalog::{NameCatalog, PictureCatalog};
use usergen::config::AppConfig;
use usergen::event::{EventBus, EventDispatcher, LoggingEventHandler};
use usergen::generator::{
    BatchGenerator, GenerationService, RandomSource, SeededRandom, UserSynthesizer,
};
use usergen::shared::AppState;
use usergen::staging::DraftFileStaging;
use usergen::web;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usergen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting test user generator");

    let config = Arc::new(AppConfig::from_env());

    // Without the name and picture catalogs nothing can be generated
    let names = match NameCatalog::load(&config.names_path()) {
        Ok(names) => Arc::new(names),
        Err(e) => {
            error!(error = %e, path = %config.names_path().display(), "Failed to load names");
            std::process::exit(1);
        }
    };
    let pictures = match PictureCatalog::load(&config.pictures_dir()) {
        Ok(pictures) => Arc::new(pictures),
        Err(e) => {
            error!(error = %e, path = %config.pictures_dir().display(), "Failed to load pictures");
            std::process::exit(1);
        }
    };

    let account_repository: Arc<dyn AccountRepository + Send + Sync> =
        match &config.database_url {
            Some(database_url) => {
                let pool = sqlx::PgPool::connect(database_url)
                    .await
                    .expect("Failed to connect to database");
                let repository = PostgresAccountRepository::new(pool);
                if let Err(e) = repository.run_migrations().await {
                    error!(error = %e, "Failed to prepare database schema");
                    std::process::exit(1);
                }
                info!("Using PostgreSQL account store");
                Arc::new(repository)
            }
            None => {
                info!("Using in-memory account store");
                Arc::new(InMemoryAccountRepository::new())
            }
        };

    let random: Arc<dyn RandomSource> = match config.seed {
        Some(seed) => {
            info!(seed, "Using fixed random seed");
            Arc::new(SeededRandom::from_seed(seed))
        }
        None => Arc::new(SeededRandom::from_os()),
    };

    let event_bus = EventBus::with_default_capacity();
    let mut dispatcher = EventDispatcher::new(event_bus.clone());
    dispatcher.add_handler(Arc::new(LoggingEventHandler));
    let _dispatcher_handle = dispatcher.start_listening();

    let synthesizer = UserSynthesizer::new(
        names,
        pictures,
        random,
        Arc::clone(&account_repository),
        Arc::new(DraftFileStaging::new(config.draft_dir.clone())),
        event_bus,
    )
    .with_email_domain(config.email_domain.clone())
    .with_max_email_attempts(config.max_email_attempts);

    let generation_service = Arc::new(GenerationService::new(
        BatchGenerator::new(synthesizer),
        Arc::clone(&account_repository),
        config.max_batch_size,
    ));

    let token_config = TokenConfig::new();
    if config.print_admin_token {
        // Printed to stderr only, never to the log
        match token_config.create_token("admin", vec![CREATE_ACCOUNTS.to_string()]) {
            Ok(token) => eprintln!("Admin token: {}", token),
            Err(e) => error!(error = %e, "Failed to create admin token"),
        }
    }

    let app_state = AppState::new(
        account_repository,
        generation_service,
        token_config,
        Arc::clone(&config),
    );

    let app = web::router(app_state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap();
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.unwrap();
}
