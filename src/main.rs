use std::{process, sync::Arc};

use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{catalog::CatalogService, error::AppError, repos::ProductStore},
    cache::{CacheConfig, CachedProducts, NullCache, ProductCache},
    config,
    infra::{
        db::PostgresProducts,
        error::InfraError,
        http::{self, ApiState},
        redis::RedisProductCache,
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let settings = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let store = init_store(&settings).await?;
    let cache = init_cache(&settings).await?;

    let product_store: Arc<dyn ProductStore> = store.clone();
    let products = Arc::new(CachedProducts::new(
        product_store,
        cache,
        CacheConfig::from(&settings.cache),
    ));
    let catalog = Arc::new(CatalogService::new(products));

    let api_state = ApiState {
        catalog,
        db: store,
    };

    serve_http(&settings, api_state).await
}

async fn init_store(settings: &config::Settings) -> Result<Arc<PostgresProducts>, AppError> {
    let write_pool = PostgresProducts::connect(&settings.database.write_url, &settings.database)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresProducts::run_migrations(&write_pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let read_pool = PostgresProducts::connect(&settings.database.read_url, &settings.database)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresProducts::new(read_pool, write_pool)))
}

async fn init_cache(settings: &config::Settings) -> Result<Arc<dyn ProductCache>, AppError> {
    match settings.cache.host.as_deref() {
        Some(host) => {
            let cache = RedisProductCache::connect(host, &settings.cache)
                .await
                .map_err(AppError::from)?;
            info!(
                target = "vetrina::startup",
                strategy = %settings.cache.strategy,
                ttl_seconds = settings.cache.list_ttl_seconds,
                "cache enabled"
            );
            Ok(Arc::new(cache))
        }
        None => {
            info!(
                target = "vetrina::startup",
                "cache not configured, serving likes from the database"
            );
            Ok(Arc::new(NullCache))
        }
    }
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_api_router(api_state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::startup",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
