//Third-party-dependencies
use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{http::header, App, HttpServer};
use log::{error, info};

use collabdocs_service::config::Settings;
use collabdocs_service::utils::auth_middleware::Authentication;
use collabdocs_service::{routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(|e| {
        error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let address = settings.server_address.clone();
    let frontend_url = settings.frontend_url.clone();

    let state = AppState::new(settings)?.into_data();
    info!("🚀 Server started at http://{}", address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        // The last wrap runs first: CORS, then access log, then path normalisation, then auth
        App::new()
            .app_data(state.clone())
            .wrap(Authentication)
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(routes::configure) // utilises methods from routes
    })
    .bind(address)?
    .run()
    .await
}
