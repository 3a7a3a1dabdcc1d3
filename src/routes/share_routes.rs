use crate::models::{ServiceError, ShareLinkCreate};
use crate::services::share_service;
use crate::utils::get_user_id_from_request;
use crate::AppState;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::{error, info};

#[post("/documents/{document_id}/share")]
async fn create_share_link(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ShareLinkCreate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();

    let link = share_service::create_share_link(&state, &user_id, &document_id, data.into_inner())
        .map_err(|e| {
            error!("❌ Share link refused for {}: {}", document_id, e);
            e
        })?;
    Ok(HttpResponse::Created().json(link))
}

#[get("/documents/{document_id}/share")]
async fn list_share_links(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let links = share_service::list_share_links(&state, &user_id, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(links))
}

#[delete("/documents/{document_id}/share/{token}")]
async fn revoke_share_link(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (document_id, token) = path.into_inner();

    share_service::revoke_share_link(&state, &user_id, &document_id, &token)?;
    Ok(HttpResponse::NoContent().finish())
}

// Redeem a share link for the signed-in user
#[post("/documents/share/{token}/accept")]
async fn accept_share_link(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    info!("🔗 User {} accepting share link", user_id);

    let collaborator = share_service::accept_share_link(&state, &user_id, &path.into_inner())
        .map_err(|e| {
            error!("❌ Share link not accepted: {}", e);
            e
        })?;
    Ok(HttpResponse::Ok().json(collaborator))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(accept_share_link)
        .service(create_share_link)
        .service(list_share_links)
        .service(revoke_share_link);
}
