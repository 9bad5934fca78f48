use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, web, App, HttpServer};
use log::info;

use tasktrack::config::Config;
use tasktrack::routes;
use tasktrack::state::AppState;
use tasktrack::store::PgStore;

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;
    info!("loaded configuration: {:?}", config);

    let store = Arc::new(
        PgStore::connect(&config)
            .await
            .map_err(|e| startup_error("failed to connect to database", e))?,
    );
    let state = web::Data::new(
        AppState::from_config(&config, store.clone(), store)
            .map_err(|e| startup_error("failed to initialise password hasher", e))?,
    );

    let cors_origin = config.cors_allowed_origin.clone();
    info!("Starting tasktrack server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
                    .supports_credentials()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
