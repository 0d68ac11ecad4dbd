use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use clap::Parser;
use dotenvy::dotenv;
use env_logger::Env;
use invoicing::api::app::{cors, create_app, create_internal_app};
use invoicing::api::metrics::{track_requests, Metrics};
use invoicing::infra;
use invoicing::infra::config::Config;
use invoicing::infra::repository::Repositories;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let pool = infra::db::pg(&config).await?;
    if !config.skip_migrations {
        infra::db::migrate(&pool).await?;
    }

    let repos = Repositories::postgres(pool);
    let metrics = web::Data::new(Metrics::new()?);
    let deadline = config.request_timeout();
    let cors_origin = config.cors_origin.clone();

    log::info!(
        host = config.http_host.as_str(),
        port = config.http_port,
        internal_port = config.internal_port;
        "Start server"
    );

    let public_metrics = metrics.clone();
    let public = HttpServer::new(move || {
        App::new()
            .configure(create_app(repos.clone(), deadline, public_metrics.clone()))
            .wrap(from_fn(track_requests))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run();

    let internal = HttpServer::new(move || {
        App::new().configure(create_internal_app(metrics.clone()))
    })
    .workers(1)
    .bind((config.http_host.as_str(), config.internal_port))?
    .run();

    tokio::try_join!(public, internal)?;

    log::info!("Server stopped");
    Ok(())
}
