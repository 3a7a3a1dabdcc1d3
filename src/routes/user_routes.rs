use crate::models::ServiceError;
use crate::services::document_service;
use crate::utils::get_user_id_from_request;
use crate::AppState;
use actix_web::{get, web, HttpRequest, HttpResponse};

// Dashboard counters for the current user
#[get("/users/me/stats")]
async fn my_stats(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let stats = document_service::user_stats(&state, &user_id)?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(my_stats);
}
