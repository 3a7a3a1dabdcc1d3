// src/services/share_service.rs
use crate::models::{
    Collaborator, CollaboratorOut, Permission, ServiceError, ShareLink, ShareLinkCreate,
    ShareLinkOut,
};
use crate::services::collaborator_service::enrich;
use crate::services::{load_document, resolve_access};
use crate::AppState;
use log::info;

// Longest lifetime a link may be given, one year
const MAX_EXPIRY_HOURS: i64 = 24 * 365;

fn to_out(state: &AppState, link: &ShareLink) -> ShareLinkOut {
    ShareLinkOut {
        token: link.token.clone(),
        role: link.role,
        expires_at: link.expires_at,
        share_url: state.settings.share_url(&link.token),
    }
}

fn require_owner(state: &AppState, user_id: &str, document_id: &str) -> Result<(), ServiceError> {
    let document = load_document(&state.storage, document_id)?;
    let access = resolve_access(&state.storage, &document, user_id)?;
    if !access.allows(Permission::ManageMembers) {
        return Err(ServiceError::Forbidden(
            "Only owner can manage share links".to_string(),
        ));
    }
    Ok(())
}

pub fn create_share_link(
    state: &AppState,
    user_id: &str,
    document_id: &str,
    request: ShareLinkCreate,
) -> Result<ShareLinkOut, ServiceError> {
    require_owner(state, user_id, document_id)?;
    if !request.role.is_grantable() {
        return Err(ServiceError::BadRequest(
            "Role must be either \"editor\" or \"reader\"".to_string(),
        ));
    }
    if let Some(hours) = request.expires_in_hours {
        if hours <= 0 || hours > MAX_EXPIRY_HOURS {
            return Err(ServiceError::BadRequest(format!(
                "expires_in_hours must be between 1 and {}",
                MAX_EXPIRY_HOURS
            )));
        }
    }

    let link = ShareLink::new(document_id, request.role, user_id, request.expires_in_hours);
    state.storage.save_share_link(&link)?;
    info!("🔗 Share link created for document {} ({})", document_id, link.role);
    Ok(to_out(state, &link))
}

pub fn list_share_links(
    state: &AppState,
    user_id: &str,
    document_id: &str,
) -> Result<Vec<ShareLinkOut>, ServiceError> {
    require_owner(state, user_id, document_id)?;
    let mut links: Vec<ShareLink> = state
        .storage
        .share_links_for_document(document_id)?
        .into_iter()
        .filter(|link| link.is_active && !link.is_expired())
        .collect();
    links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(links.iter().map(|link| to_out(state, link)).collect())
}

pub fn revoke_share_link(
    state: &AppState,
    user_id: &str,
    document_id: &str,
    token: &str,
) -> Result<(), ServiceError> {
    require_owner(state, user_id, document_id)?;

    let storage = &state.storage;
    let _guard = storage.lock()?;
    let mut link = storage
        .find_share_link(token)?
        .filter(|link| link.document_id == document_id && link.is_active)
        .ok_or_else(|| ServiceError::NotFound("Share link not found".to_string()))?;
    link.is_active = false;
    storage.save_share_link(&link)?;

    info!("🔒 Share link revoked for document {}", document_id);
    Ok(())
}

/// Join a document through a share link. Links can be used any number of
/// times until revoked or expired; an existing collaborator is only ever
/// upgraded, never downgraded.
pub fn accept_share_link(
    state: &AppState,
    user_id: &str,
    token: &str,
) -> Result<CollaboratorOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let invalid = || ServiceError::NotFound("Invalid or expired share link".to_string());
    let link = storage
        .find_share_link(token)?
        .filter(|link| link.is_active)
        .ok_or_else(invalid)?;
    if link.is_expired() {
        return Err(ServiceError::BadRequest("Share link has expired".to_string()));
    }
    let document = storage
        .find_document_by_id(&link.document_id)?
        .ok_or_else(invalid)?;
    if document.owner_id == user_id {
        return Err(ServiceError::BadRequest(
            "You already own this document".to_string(),
        ));
    }

    let mut collaborators = storage.get_collaborators(&document.id)?;
    let collaborator = match collaborators.iter_mut().find(|c| c.user_id == user_id) {
        Some(existing) => {
            if link.role > existing.role {
                existing.role = link.role;
                info!("⬆️ Upgraded {} to {} on document {}", user_id, link.role, document.id);
            }
            existing.clone()
        }
        None => {
            let created = Collaborator::new(&document.id, user_id, link.role);
            collaborators.push(created.clone());
            info!("✅ {} joined document {} as {}", user_id, document.id, link.role);
            created
        }
    };
    storage.save_collaborators(&document.id, &collaborators)?;

    enrich(storage, &collaborator)
}
