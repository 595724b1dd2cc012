pub mod prelude {
    pub use crate::db::Parameters;
    pub use crate::error::{AppError, AppResult};

    pub use actix_web::{
        get, middleware, post, put,
        web::{self, Json},
        App, HttpRequest, HttpResponse, HttpServer, Responder,
    };
    pub use actix_web_opentelemetry::{PrometheusMetricsHandler, RequestMetrics, RequestTracing};
    pub use futures_util::future::join_all;
    pub use maud::{html, Markup, DOCTYPE};
    pub use opentelemetry::global;
    pub use opentelemetry_sdk::metrics::MeterProvider;
    pub use r2d2::Pool;
    pub use r2d2::PooledConnection;
    pub use r2d2_sqlite::SqliteConnectionManager;
    pub use rusqlite::{params, OptionalExtension};
    pub use rusqlite_migration::{Migrations, M};
    pub use serde::{Deserialize, Serialize};
}

mod api;
mod config;
mod db;
mod error;
mod metrics;
mod nls;
mod travis;
mod view;
mod web;

use actix_web::web::Data;
use prometheus::Registry;

use crate::api::{register_node, NodeRequest};
use crate::config::Config;
use crate::db::migrations::migrate;
use crate::error::{format_anyhow_chain, format_error_chain};
use crate::prelude::*;
use crate::travis::TravisPlugin;

async fn start_http(
    registry: Registry,
    pool: Pool<SqliteConnectionManager>,
    config: Config,
) -> Result<(), std::io::Error> {
    log::info!(
        "Starting HTTP server at http://{}:{}/",
        config.bind_address,
        config.port
    );
    let address = (config.bind_address.clone(), config.port);
    let plugin = TravisPlugin::new(pool.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(RequestTracing::new())
            .wrap(RequestMetrics::default())
            .route(
                "/api/metrics",
                actix_web::web::get().to(PrometheusMetricsHandler::new(registry.clone())),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(plugin.clone()))
            .app_data(Data::new(config.clone()))
            .wrap(middleware::Logger::default())
            .configure(travis::resource::configure)
            .configure(api::configure)
            .configure(crate::web::configure)
    })
    .bind(address)?
    .run()
    .await
}

async fn run() -> AppResult<()> {
    let config = Config::from_env()?;

    let registry = Registry::new();
    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| AppError::Internal(format!("Prometheus exporter: {}", e)))?;
    let provider = MeterProvider::builder().with_reader(exporter).build();
    global::set_meter_provider(provider);
    metrics::init(&registry).map_err(|e| AppError::Internal(format_anyhow_chain(&e)))?;

    // connect to SQLite DB
    let manager = SqliteConnectionManager::file(&config.database_path);
    let pool = Pool::new(manager)?;
    migrate(pool.get()?)?;

    if let Some(seed) = &config.seed_node {
        register_node(&NodeRequest::from(seed), &pool.get()?)?;
    }

    start_http(registry, pool, config).await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = run().await {
        log::error!("{}", format_error_chain(&e));
        std::process::exit(1);
    }

    Ok(())
}
