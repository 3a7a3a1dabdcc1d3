use crate::models::{CollaboratorAdd, CollaboratorUpdateRole, ServiceError};
use crate::services::collaborator_service;
use crate::utils::get_user_id_from_request;
use crate::AppState;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::{error, info};

#[get("/documents/{document_id}/collaborators")]
async fn list_collaborators(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();
    info!("👥 Listing collaborators of document: {}", document_id);

    let collaborators = collaborator_service::list_collaborators(&state, &user_id, &document_id)?;
    Ok(HttpResponse::Ok().json(collaborators))
}

#[post("/documents/{document_id}/collaborators")]
async fn add_collaborator(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<CollaboratorAdd>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();

    let collaborator =
        collaborator_service::add_collaborator(&state, &user_id, &document_id, data.into_inner())
            .map_err(|e| {
                error!("❌ Could not add collaborator to {}: {}", document_id, e);
                e
            })?;
    Ok(HttpResponse::Created().json(collaborator))
}

#[put("/documents/{document_id}/collaborators/{user_id}")]
async fn update_collaborator(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Json<CollaboratorUpdateRole>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (document_id, target_user_id) = path.into_inner();

    let collaborator = collaborator_service::update_collaborator_role(
        &state,
        &user_id,
        &document_id,
        &target_user_id,
        data.role,
    )?;
    Ok(HttpResponse::Ok().json(collaborator))
}

#[delete("/documents/{document_id}/collaborators/{user_id}")]
async fn remove_collaborator(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (document_id, target_user_id) = path.into_inner();

    collaborator_service::remove_collaborator(&state, &user_id, &document_id, &target_user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_collaborators)
        .service(add_collaborator)
        .service(update_collaborator)
        .service(remove_collaborator);
}
