// src/routes/mod.rs
use crate::models::ServiceError;
use actix_web::error::InternalError;
use actix_web::{get, web, HttpResponse, ResponseError};
use serde_json::json;

pub mod auth_routes;
pub mod collaborator_routes;
pub mod document_routes;
pub mod share_routes;
pub mod user_routes;
pub mod workspace_routes;

// Structured documents can be large; content itself is capped by the service
const JSON_LIMIT: usize = 8 * 1024 * 1024;

#[get("/")]
async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "CollabDocs API is running" }))
}

// Malformed bodies and query strings answer with the same `detail` shape as other errors
fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let response = ServiceError::BadRequest(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
}

// Register every route plus the extractor configs
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| bad_request(err)),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err)))
    .app_data(web::FormConfig::default().error_handler(|err, _req| bad_request(err)))
    .service(index);

    auth_routes::init_routes(cfg);
    user_routes::init_routes(cfg);
    share_routes::init_routes(cfg);
    collaborator_routes::init_routes(cfg);
    document_routes::init_routes(cfg);
    workspace_routes::init_routes(cfg);
}
