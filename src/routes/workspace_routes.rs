// src/routes/workspace_routes.rs
use crate::models::{MembershipCreate, MembershipUpdate, ServiceError, WorkspaceData};
use crate::services::workspace_service;
use crate::utils::get_user_id_from_request;
use crate::AppState;
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use log::{error, info};

// Create a new workspace
#[post("/workspaces")]
async fn create_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<WorkspaceData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    info!("🏢 Creating workspace '{}' for user: {}", data.name, user_id);

    let workspace = workspace_service::create_workspace(&state, &user_id, &data.name)?;
    Ok(HttpResponse::Created().json(workspace))
}

// Workspaces the current user belongs to
#[get("/workspaces")]
async fn list_workspaces(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspaces = workspace_service::list_workspaces(&state, &user_id)?;
    Ok(HttpResponse::Ok().json(workspaces))
}

#[get("/workspaces/{workspace_id}")]
async fn get_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace = workspace_service::get_workspace(&state, &user_id, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(workspace))
}

#[patch("/workspaces/{workspace_id}")]
async fn update_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<WorkspaceData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();

    let workspace = workspace_service::update_workspace(&state, &user_id, &workspace_id, &data.name)
        .map_err(|e| {
            error!("❌ Workspace update failed for {}: {}", workspace_id, e);
            e
        })?;
    Ok(HttpResponse::Ok().json(workspace))
}

#[delete("/workspaces/{workspace_id}")]
async fn delete_workspace(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();
    info!("🗑️ Deleting workspace: {}", workspace_id);

    workspace_service::delete_workspace(&state, &user_id, &workspace_id)?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/workspaces/{workspace_id}/members")]
async fn list_members(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let members = workspace_service::list_members(&state, &user_id, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(members))
}

#[post("/workspaces/{workspace_id}/members")]
async fn add_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<MembershipCreate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();

    let member = workspace_service::add_member(&state, &user_id, &workspace_id, data.into_inner())
        .map_err(|e| {
            error!("❌ Could not add member to workspace {}: {}", workspace_id, e);
            e
        })?;
    Ok(HttpResponse::Created().json(member))
}

#[patch("/workspaces/{workspace_id}/members/{user_id}")]
async fn update_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Json<MembershipUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (workspace_id, target_user_id) = path.into_inner();

    let member = workspace_service::update_member(
        &state,
        &user_id,
        &workspace_id,
        &target_user_id,
        data.role,
    )?;
    Ok(HttpResponse::Ok().json(member))
}

#[delete("/workspaces/{workspace_id}/members/{user_id}")]
async fn remove_member(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (workspace_id, target_user_id) = path.into_inner();

    workspace_service::remove_member(&state, &user_id, &workspace_id, &target_user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_workspace)
        .service(list_workspaces)
        .service(get_workspace)
        .service(update_workspace)
        .service(delete_workspace)
        .service(list_members)
        .service(add_member)
        .service(update_member)
        .service(remove_member);
}
