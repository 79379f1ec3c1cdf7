use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use rolegate::app::{connect_store, AuthState};
use rolegate::config::Config;
use rolegate::routes::{self, health};

fn fatal(err: rolegate::AppError) -> std::io::Error {
    log::error!("startup failed: {}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(fatal)?;
    log::debug!("loaded {:?}", config);

    let store = connect_store(&config).await.map_err(fatal)?;
    let state = AuthState::new(&config, store).map_err(fatal)?;

    log::info!("Starting rolegate server at {}", config.server_url());
    HttpServer::new(move || {
        let verifier = state.verifier.clone();
        App::new()
            .app_data(state.service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(|cfg| routes::configure(cfg, &verifier)))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
