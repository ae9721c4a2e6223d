use actix_web::{web, App, HttpServer};
use log::{info, warn};
use std::io;
use std::path::Path;

use movie_catalog::api;
use movie_catalog::app_state::AppState;
use movie_catalog::config::{AppConfig, LoggingConfig};

fn init_logging(logging: &LoggingConfig) -> io::Result<()> {
    if Path::new(&logging.config_file).exists() {
        log4rs::init_file(&logging.config_file, Default::default()).map_err(io::Error::other)?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        warn!("{} not found, logging to stderr", logging.config_file);
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::load().map_err(io::Error::other)?;
    init_logging(&config.logging)?;

    let server = config.server.clone();
    let max_payload_size = server.max_payload_size;
    let app_state = AppState::from_config(config).await.map_err(io::Error::other)?;
    let app_state = web::Data::new(app_state);

    info!("Starting server on {}:{}", server.host, server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .configure(api::configure)
    })
    .workers(server.workers)
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
