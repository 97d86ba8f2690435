use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use coldchain_api::{app, demo, AppState};
use coldchain_order::{ContractRegistry, InMemoryContractRegistry, InMemoryOrderRegistry, OrderRegistry};
use coldchain_store::app_config::{Config, RegistryBackend};
use coldchain_store::RedisRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "coldchain_api=debug,coldchain_order=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting cold-chain service on port {}", config.server.port);

    let (orders, contracts) = match config.registry.backend {
        RegistryBackend::Memory => (
            Arc::new(InMemoryOrderRegistry::new()) as Arc<dyn OrderRegistry>,
            Arc::new(InMemoryContractRegistry::new()) as Arc<dyn ContractRegistry>,
        ),
        RegistryBackend::Redis => {
            let registry = Arc::new(RedisRegistry::new(config.redis_url()?)?);
            tracing::info!("Using Redis registry");
            (
                registry.clone() as Arc<dyn OrderRegistry>,
                registry as Arc<dyn ContractRegistry>,
            )
        }
    };

    if config.demo.seed_on_startup {
        if let Err(e) = demo::seed_demo(orders.as_ref(), contracts.as_ref(), Utc::now()).await {
            // Already seeded by a previous run against the same store
            tracing::warn!("Demo seed skipped: {}", e);
        }
    }

    let state = AppState::new(orders, contracts, config.stream.capacity);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
