use std::sync::Arc;

use crate::config::{CacheProvider, Config, LogFormat};
use anyhow::Context;
use broker_query_cache_memory::MemoryCacheManager;
use broker_query_core::brokers::{
    BrokerRefreshService, BrokerRefreshServiceTrait, BrokerViewStore, BrokerViewStoreTrait,
};
use broker_query_core::cache::CacheManagerTrait;
use broker_query_portfolio_client::PortfolioApiClient;
use broker_query_storage_sqlite::SqliteCacheManager;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub broker_store: Arc<dyn BrokerViewStoreTrait>,
    /// Only present when a Portfolio service URL is configured.
    pub refresh_service: Option<Arc<dyn BrokerRefreshServiceTrait>>,
}

impl AppState {
    pub fn new(
        broker_store: Arc<dyn BrokerViewStoreTrait>,
        refresh_service: Option<Arc<dyn BrokerRefreshServiceTrait>>,
    ) -> Self {
        Self {
            broker_store,
            refresh_service,
        }
    }
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

fn build_cache_manager(config: &Config) -> anyhow::Result<Arc<dyn CacheManagerTrait>> {
    let manager: Arc<dyn CacheManagerTrait> = match config.cache_provider {
        CacheProvider::Memory => {
            tracing::info!("Using in-memory cache provider");
            Arc::new(MemoryCacheManager::new())
        }
        CacheProvider::Sqlite => {
            tracing::info!("Using SQLite cache provider at {}", config.cache_path);
            // An unopenable database is a configuration error, unlike a
            // region that fails to initialize later.
            let manager = SqliteCacheManager::open(&config.cache_path)
                .with_context(|| format!("invalid BQ_CACHE_PATH {}", config.cache_path))?;
            Arc::new(manager)
        }
    };
    Ok(manager)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let manager = build_cache_manager(config)?;
    let broker_store = Arc::new(BrokerViewStore::with_cache_name(
        manager,
        config.cache_name.as_str(),
    ));

    // A failure here is not fatal: the store retries on first use and
    // readiness reports the problem.
    if let Err(e) = broker_store.initialize().await {
        tracing::warn!("Broker store not ready at startup: {}", e);
    }

    let refresh_service: Option<Arc<dyn BrokerRefreshServiceTrait>> = match &config.portfolio_url
    {
        Some(url) => {
            tracing::info!("Portfolio refresh enabled against {}", url);
            let client = PortfolioApiClient::new(url, config.portfolio_token.as_deref())?;
            Some(Arc::new(BrokerRefreshService::new(
                broker_store.clone(),
                Arc::new(client),
            )))
        }
        None => None,
    };

    Ok(Arc::new(AppState::new(broker_store, refresh_service)))
}
