// src/services/collaborator_service.rs
use crate::models::{
    Collaborator, CollaboratorAdd, CollaboratorOut, Document, DocumentRole, Permission,
    ServiceError,
};
use crate::services::{load_document, resolve_access, resolve_user};
use crate::utils::Storage;
use crate::AppState;
use log::info;

// Owner-only gate shared by every collaborator change
fn require_manager(
    storage: &Storage,
    document: &Document,
    user_id: &str,
    action: &str,
) -> Result<(), ServiceError> {
    let access = resolve_access(storage, document, user_id)?;
    if !access.allows(Permission::ManageMembers) {
        return Err(ServiceError::Forbidden(format!(
            "Access denied. Only the document owner can {}. Your role: {}",
            action,
            access.role_name()
        )));
    }
    Ok(())
}

fn require_grantable(role: DocumentRole) -> Result<(), ServiceError> {
    if !role.is_grantable() {
        return Err(ServiceError::BadRequest(
            "Role must be either \"editor\" or \"reader\"".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn enrich(storage: &Storage, collaborator: &Collaborator) -> Result<CollaboratorOut, ServiceError> {
    let mut out = CollaboratorOut::bare(collaborator);
    if let Some(user) = storage.find_user_by_id(&collaborator.user_id)? {
        out.username = user.username;
        out.email = Some(user.email);
    }
    Ok(out)
}

pub fn list_collaborators(
    state: &AppState,
    user_id: &str,
    document_id: &str,
) -> Result<Vec<CollaboratorOut>, ServiceError> {
    let storage = &state.storage;
    let document = load_document(storage, document_id)?;
    if !resolve_access(storage, &document, user_id)?.has_any() {
        return Err(ServiceError::Forbidden(
            "Access denied. You are not a collaborator on this document.".to_string(),
        ));
    }

    storage
        .get_collaborators(document_id)?
        .iter()
        .map(|collaborator| enrich(storage, collaborator))
        .collect()
}

pub fn add_collaborator(
    state: &AppState,
    user_id: &str,
    document_id: &str,
    request: CollaboratorAdd,
) -> Result<CollaboratorOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let document = load_document(storage, document_id)?;
    require_manager(storage, &document, user_id, "add collaborators")?;
    require_grantable(request.role)?;

    let target = resolve_user(storage, request.user_id.as_deref(), request.email.as_deref())?;
    if target.id == user_id {
        return Err(ServiceError::BadRequest(
            "Cannot add yourself as a collaborator.".to_string(),
        ));
    }
    if target.id == document.owner_id {
        return Err(ServiceError::BadRequest(
            "Cannot add the document owner as a collaborator.".to_string(),
        ));
    }

    let mut collaborators = storage.get_collaborators(document_id)?;
    if collaborators.iter().any(|c| c.user_id == target.id) {
        return Err(ServiceError::BadRequest(
            "User is already a collaborator".to_string(),
        ));
    }

    let collaborator = Collaborator::new(document_id, &target.id, request.role);
    collaborators.push(collaborator.clone());
    storage.save_collaborators(document_id, &collaborators)?;

    info!("✅ Added {} as {} on document {}", target.id, request.role, document_id);
    enrich(storage, &collaborator)
}

pub fn update_collaborator_role(
    state: &AppState,
    user_id: &str,
    document_id: &str,
    target_user_id: &str,
    role: DocumentRole,
) -> Result<CollaboratorOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let document = load_document(storage, document_id)?;
    require_manager(storage, &document, user_id, "change roles")?;
    if target_user_id == document.owner_id {
        return Err(ServiceError::BadRequest(
            "Cannot change the document owner's role.".to_string(),
        ));
    }
    require_grantable(role)?;

    let mut collaborators = storage.get_collaborators(document_id)?;
    let collaborator = collaborators
        .iter_mut()
        .find(|c| c.user_id == target_user_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "User {} is not a collaborator on this document",
                target_user_id
            ))
        })?;
    collaborator.role = role;
    let updated = collaborator.clone();
    storage.save_collaborators(document_id, &collaborators)?;

    info!("✅ Role of {} on document {} is now {}", target_user_id, document_id, role);
    enrich(storage, &updated)
}

pub fn remove_collaborator(
    state: &AppState,
    user_id: &str,
    document_id: &str,
    target_user_id: &str,
) -> Result<(), ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let document = load_document(storage, document_id)?;
    require_manager(storage, &document, user_id, "remove collaborators")?;
    if target_user_id == document.owner_id {
        return Err(ServiceError::BadRequest(
            "Cannot remove the document owner.".to_string(),
        ));
    }

    let mut collaborators = storage.get_collaborators(document_id)?;
    let before = collaborators.len();
    collaborators.retain(|c| c.user_id != target_user_id);
    if collaborators.len() == before {
        return Err(ServiceError::NotFound(format!(
            "User {} is not a collaborator on this document",
            target_user_id
        )));
    }
    storage.save_collaborators(document_id, &collaborators)?;

    info!("✅ Removed {} from document {}", target_user_id, document_id);
    Ok(())
}
