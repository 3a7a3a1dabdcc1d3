use crate::models::{
    DocumentCreate, DocumentOut, DocumentRole, DocumentUpdate, ListQuery, SearchQuery, ServiceError,
};
use crate::services::document_service::{self, ExportFormat};
use crate::utils::get_user_id_from_request;
use crate::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::{error, info};

// List the documents the caller can open
#[get("/documents")]
async fn list_documents(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (skip, limit) = document_service::page(query.skip, query.limit)?;
    info!("📋 Listing documents for user: {}", user_id);

    let documents =
        document_service::list_documents(&state, &user_id, skip, limit, query.search.as_deref())?;
    Ok(HttpResponse::Ok().json(documents))
}

#[get("/documents/search")]
async fn search_documents(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (skip, limit) = document_service::page(query.skip, query.limit)?;
    info!("🔍 Searching documents for user: {}", user_id);

    let documents = document_service::search_documents(&state, &user_id, &query.q, skip, limit)?;
    Ok(HttpResponse::Ok().json(documents))
}

#[post("/documents")]
async fn create_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    data: web::Json<DocumentCreate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    info!("📄 Creating document for user: {}", user_id);

    let document =
        document_service::create_document(&state, &user_id, data.into_inner(), None).map_err(|e| {
            error!("❌ Document creation failed: {}", e);
            e
        })?;

    Ok(HttpResponse::Created().json(DocumentOut {
        role: Some(DocumentRole::Owner),
        document,
    }))
}

#[get("/documents/workspace/{workspace_id}")]
async fn list_workspace_documents(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();

    let documents = document_service::workspace_documents(&state, &user_id, &workspace_id)?;
    Ok(HttpResponse::Ok().json(documents))
}

#[post("/documents/workspace/{workspace_id}")]
async fn create_workspace_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<DocumentCreate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let workspace_id = path.into_inner();
    info!("📄 Creating document in workspace {} for user: {}", workspace_id, user_id);

    let document = document_service::create_document(
        &state,
        &user_id,
        data.into_inner(),
        Some(&workspace_id),
    )?;
    let document = document_service::get_document(&state, &user_id, &document.id)?;
    Ok(HttpResponse::Created().json(document))
}

#[get("/documents/{document_id}")]
async fn get_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();

    let document = document_service::get_document(&state, &user_id, &document_id).map_err(|e| {
        error!("❌ Cannot open document {}: {}", document_id, e);
        e
    })?;
    Ok(HttpResponse::Ok().json(document))
}

// Whole-field overwrite; served for both PUT and PATCH
async fn update_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<DocumentUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();
    info!("💾 Saving document {} for user: {}", document_id, user_id);

    let document =
        document_service::update_document(&state, &user_id, &document_id, data.into_inner())
            .map_err(|e| {
                error!("❌ Save rejected for document {}: {}", document_id, e);
                e
            })?;
    Ok(HttpResponse::Ok().json(document))
}

#[delete("/documents/{document_id}")]
async fn delete_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let document_id = path.into_inner();

    document_service::delete_document(&state, &user_id, &document_id).map_err(|e| {
        error!("❌ Delete rejected for document {}: {}", document_id, e);
        e
    })?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/documents/{document_id}/export/{format}")]
async fn export_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (document_id, format) = path.into_inner();
    let format: ExportFormat = format.parse()?;

    let export = document_service::export_document(&state, &user_id, &document_id, format)?;
    info!("📤 Exported document {} as {}", document_id, export.filename);

    Ok(HttpResponse::Ok()
        .content_type(export.format.mime_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.body))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_documents)
        .service(search_documents)
        .service(create_document)
        .service(list_workspace_documents)
        .service(create_workspace_document)
        .service(get_document)
        .service(delete_document)
        .service(export_document)
        // Method-guarded handlers above must come first; this resource answers 405 otherwise
        .service(
            web::resource("/documents/{document_id}")
                .route(web::put().to(update_document))
                .route(web::patch().to(update_document)),
        );
}
