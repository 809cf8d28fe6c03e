use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use openbills::config::{Config, StoreKind};
use openbills::mongo::MongoStore;
use openbills::routes::{configure, AppState};
use openbills::store::{MemoryStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let store: Arc<dyn Store> = match &config.store {
        StoreKind::Mongo { uri, database } => {
            log::info!("Using MongoDB database {database}");
            let store = MongoStore::connect(uri, database)
                .await
                .map_err(std::io::Error::other)?;
            log::info!("Connected");
            Arc::new(store)
        }
        StoreKind::Memory => {
            log::warn!("Using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let state = web::Data::new(AppState::new(store, config.auth_secret.clone()));

    log::info!("Listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
