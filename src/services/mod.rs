use crate::models::{
    Document, DocumentRole, Permission, ServiceError, User, WorkspaceRole,
};
use crate::utils::Storage;

pub mod auth_service;
pub mod collaborator_service;
pub mod document_service;
pub mod share_service;
pub mod workspace_service;

/// What a user may do with one document: their collaborator entry and,
/// for workspace documents, their workspace membership.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentAccess {
    pub collaborator: Option<DocumentRole>,
    pub workspace: Option<WorkspaceRole>,
}

impl DocumentAccess {
    pub fn allows(&self, permission: Permission) -> bool {
        self.collaborator
            .map_or(false, |role| role.permissions().contains(&permission))
            || self.workspace.map_or(false, |role| role.allows(permission))
    }

    pub fn has_any(&self) -> bool {
        self.allows(Permission::ViewDocument)
    }

    // Role reported to clients; workspace roles are folded onto document roles
    pub fn role(&self) -> Option<DocumentRole> {
        let from_workspace = self.workspace.map(|role| match role {
            WorkspaceRole::Owner => DocumentRole::Owner,
            WorkspaceRole::Admin | WorkspaceRole::Editor => DocumentRole::Editor,
            WorkspaceRole::Viewer => DocumentRole::Reader,
        });
        match (self.collaborator, from_workspace) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn role_name(&self) -> &'static str {
        self.role().map_or("none", |role| role.as_str())
    }
}

pub(crate) fn resolve_access(
    storage: &Storage,
    document: &Document,
    user_id: &str,
) -> Result<DocumentAccess, ServiceError> {
    let mut collaborator = storage
        .find_collaborator(&document.id, user_id)?
        .map(|c| c.role);
    if document.owner_id == user_id {
        collaborator = Some(DocumentRole::Owner);
    }

    let workspace = match &document.workspace_id {
        Some(workspace_id) => storage
            .find_membership(workspace_id, user_id)?
            .map(|m| m.role),
        None => None,
    };

    Ok(DocumentAccess {
        collaborator,
        workspace,
    })
}

pub(crate) fn load_document(storage: &Storage, id: &str) -> Result<Document, ServiceError> {
    storage
        .find_document_by_id(id)?
        .ok_or_else(|| ServiceError::NotFound("Document not found".to_string()))
}

// Target user of a collaborator or member add, given by id or by email
pub(crate) fn resolve_user(
    storage: &Storage,
    user_id: Option<&str>,
    email: Option<&str>,
) -> Result<User, ServiceError> {
    match (user_id, email) {
        (Some(id), _) => storage
            .find_user_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", id))),
        (None, Some(email)) => storage
            .find_user_by_email(email)?
            .ok_or_else(|| ServiceError::NotFound(format!("User with email {} not found", email))),
        (None, None) => Err(ServiceError::BadRequest(
            "Either user_id or email is required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_role_widens_document_access() {
        let access = DocumentAccess {
            collaborator: Some(DocumentRole::Reader),
            workspace: Some(WorkspaceRole::Admin),
        };
        assert!(access.allows(Permission::DeleteDocument));
        assert_eq!(access.role(), Some(DocumentRole::Editor));
    }

    #[test]
    fn no_entries_means_no_access() {
        let access = DocumentAccess::default();
        assert!(!access.has_any());
        assert_eq!(access.role_name(), "none");
    }

    #[test]
    fn reader_only_views() {
        let access = DocumentAccess {
            collaborator: Some(DocumentRole::Reader),
            workspace: None,
        };
        assert!(access.has_any());
        assert!(!access.allows(Permission::EditDocument));
        assert!(!access.allows(Permission::ManageMembers));
    }
}
