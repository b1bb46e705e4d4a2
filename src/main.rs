use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gamerec_api::{
    config::Config,
    graph::{CypherSource, GameSource, Neo4jGateway, SourceSchema},
    models::AttributeMode,
    routes::{cors_layer, create_router, AppState},
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamerec_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let vgsales = Neo4jGateway::connect(
        &config.vgsales_uri,
        &config.vgsales_user,
        &config.vgsales_password,
    )
    .await
    .context("connecting to vgsales graph")?;

    let videogames = Neo4jGateway::connect(
        &config.videogames_uri,
        &config.videogames_user,
        &config.videogames_password,
    )
    .await
    .context("connecting to videogames graph")?;

    let sources: Vec<Arc<dyn GameSource>> = vec![
        Arc::new(CypherSource::new(SourceSchema::vgsales(), Arc::new(vgsales))),
        Arc::new(CypherSource::new(
            SourceSchema::videogames(),
            Arc::new(videogames),
        )),
    ];

    for source in &sources {
        if source.is_reachable().await {
            tracing::info!(source = %source.tag(), "Graph source reachable");
        } else {
            tracing::warn!(source = %source.tag(), "Graph source failed connectivity probe");
        }
    }

    let attribute_mode = if config.single_valued_attributes {
        AttributeMode::SingleValued
    } else {
        AttributeMode::MultiValued
    };

    let recommender = Recommender::initialize(sources, attribute_mode)
        .await
        .context("initializing recommender")?;

    if config.index_reload_hours > 0 {
        recommender.spawn_index_reload(config.index_reload_hours);
    }

    let app = create_router(AppState::new(recommender)).layer(cors_layer(config.allowed_origins()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
