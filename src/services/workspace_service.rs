// src/services/workspace_service.rs
use crate::models::{
    Membership, MembershipCreate, MembershipOut, Permission, ServiceError, Workspace,
    WorkspaceRole,
};
use crate::services::document_service::remove_document;
use crate::services::resolve_user;
use crate::utils::Storage;
use crate::AppState;
use chrono::Utc;
use log::info;
use uuid::Uuid;

pub const MAX_WORKSPACE_NAME_LENGTH: usize = 100;

fn validate_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::BadRequest("Workspace name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_WORKSPACE_NAME_LENGTH {
        return Err(ServiceError::BadRequest(format!(
            "Workspace name cannot exceed {} characters",
            MAX_WORKSPACE_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

fn ensure_unique_name(
    storage: &Storage,
    owner_id: &str,
    name: &str,
    except_id: Option<&str>,
) -> Result<(), ServiceError> {
    let taken = storage.list_workspaces()?.iter().any(|ws| {
        ws.owner_id == owner_id && ws.name == name && Some(ws.id.as_str()) != except_id
    });
    if taken {
        return Err(ServiceError::BadRequest(
            "You already have a workspace with this name.".to_string(),
        ));
    }
    Ok(())
}

fn load_workspace(storage: &Storage, id: &str) -> Result<Workspace, ServiceError> {
    storage
        .find_workspace_by_id(id)?
        .ok_or_else(|| ServiceError::NotFound("Workspace not found".to_string()))
}

fn require_member(
    storage: &Storage,
    workspace_id: &str,
    user_id: &str,
) -> Result<Membership, ServiceError> {
    storage
        .find_membership(workspace_id, user_id)?
        .ok_or_else(|| ServiceError::Forbidden("Not a member of this workspace.".to_string()))
}

fn require_permission(
    storage: &Storage,
    workspace_id: &str,
    user_id: &str,
    permission: Permission,
) -> Result<(), ServiceError> {
    let membership = require_member(storage, workspace_id, user_id)?;
    if !membership.role.allows(permission) {
        return Err(ServiceError::Forbidden(
            "Only workspace owners can manage members.".to_string(),
        ));
    }
    Ok(())
}

// A workspace has exactly one Owner membership, created with it
fn require_assignable(role: WorkspaceRole) -> Result<(), ServiceError> {
    if role == WorkspaceRole::Owner {
        return Err(ServiceError::BadRequest(
            "A workspace has exactly one owner.".to_string(),
        ));
    }
    Ok(())
}

fn enrich(storage: &Storage, membership: Membership) -> Result<MembershipOut, ServiceError> {
    let user = storage.find_user_by_id(&membership.user_id)?;
    Ok(MembershipOut {
        username: user.as_ref().and_then(|u| u.username.clone()),
        email: user.map(|u| u.email),
        membership,
    })
}

pub fn create_workspace(
    state: &AppState,
    user_id: &str,
    name: &str,
) -> Result<Workspace, ServiceError> {
    let name = validate_name(name)?;
    let storage = &state.storage;
    let _guard = storage.lock()?;
    ensure_unique_name(storage, user_id, &name, None)?;

    let now = Utc::now();
    let workspace = Workspace {
        id: Uuid::new_v4().to_string(),
        name,
        owner_id: user_id.to_string(),
        created_at: now,
        updated_at: now,
    };
    storage.save_workspace(&workspace)?;
    storage.save_memberships(
        &workspace.id,
        &[Membership::new(&workspace.id, user_id, WorkspaceRole::Owner)],
    )?;

    info!("✅ Workspace created: {} by {}", workspace.id, user_id);
    Ok(workspace)
}

pub fn list_workspaces(state: &AppState, user_id: &str) -> Result<Vec<Workspace>, ServiceError> {
    let storage = &state.storage;
    let mut workspaces = Vec::new();
    for membership in storage.memberships_for_user(user_id)? {
        if let Some(workspace) = storage.find_workspace_by_id(&membership.workspace_id)? {
            workspaces.push(workspace);
        }
    }
    workspaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(workspaces)
}

pub fn get_workspace(state: &AppState, user_id: &str, id: &str) -> Result<Workspace, ServiceError> {
    let workspace = load_workspace(&state.storage, id)?;
    require_member(&state.storage, id, user_id)?;
    Ok(workspace)
}

pub fn update_workspace(
    state: &AppState,
    user_id: &str,
    id: &str,
    name: &str,
) -> Result<Workspace, ServiceError> {
    let name = validate_name(name)?;
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let mut workspace = load_workspace(storage, id)?;
    if workspace.owner_id != user_id {
        return Err(ServiceError::Forbidden(
            "Not authorized to update this workspace.".to_string(),
        ));
    }
    ensure_unique_name(storage, user_id, &name, Some(id))?;
    workspace.name = name;
    workspace.updated_at = Utc::now();
    storage.save_workspace(&workspace)?;

    info!("✅ Workspace renamed: {}", workspace.id);
    Ok(workspace)
}

// Removes the workspace, its memberships and every document filed in it
pub fn delete_workspace(state: &AppState, user_id: &str, id: &str) -> Result<(), ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let workspace = load_workspace(storage, id)?;
    if workspace.owner_id != user_id {
        return Err(ServiceError::Forbidden(
            "Not authorized to delete this workspace.".to_string(),
        ));
    }

    for document in storage.list_documents()? {
        if document.workspace_id.as_deref() == Some(id) {
            remove_document(storage, &document.id)?;
        }
    }
    storage.delete_workspace_record(id)?;

    info!("🗑️ Workspace deleted: {} by {}", id, user_id);
    Ok(())
}

pub fn list_members(
    state: &AppState,
    user_id: &str,
    workspace_id: &str,
) -> Result<Vec<MembershipOut>, ServiceError> {
    let storage = &state.storage;
    load_workspace(storage, workspace_id)?;
    require_member(storage, workspace_id, user_id)?;
    storage
        .get_memberships(workspace_id)?
        .into_iter()
        .map(|membership| enrich(storage, membership))
        .collect()
}

pub fn add_member(
    state: &AppState,
    user_id: &str,
    workspace_id: &str,
    request: MembershipCreate,
) -> Result<MembershipOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    load_workspace(storage, workspace_id)?;
    require_permission(storage, workspace_id, user_id, Permission::ManageMembers)?;
    require_assignable(request.role)?;

    let target = resolve_user(storage, request.user_id.as_deref(), request.email.as_deref())?;
    let mut memberships = storage.get_memberships(workspace_id)?;
    if memberships.iter().any(|m| m.user_id == target.id) {
        return Err(ServiceError::BadRequest(
            "User is already a member of this workspace.".to_string(),
        ));
    }

    let membership = Membership::new(workspace_id, &target.id, request.role);
    memberships.push(membership.clone());
    storage.save_memberships(workspace_id, &memberships)?;

    info!("✅ Added {} to workspace {} as {:?}", target.id, workspace_id, request.role);
    enrich(storage, membership)
}

pub fn update_member(
    state: &AppState,
    user_id: &str,
    workspace_id: &str,
    target_user_id: &str,
    role: WorkspaceRole,
) -> Result<MembershipOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let workspace = load_workspace(storage, workspace_id)?;
    require_permission(storage, workspace_id, user_id, Permission::ManageMembers)?;
    if target_user_id == workspace.owner_id {
        return Err(ServiceError::BadRequest(
            "The workspace owner's role cannot be changed.".to_string(),
        ));
    }
    require_assignable(role)?;

    let mut memberships = storage.get_memberships(workspace_id)?;
    let membership = memberships
        .iter_mut()
        .find(|m| m.user_id == target_user_id)
        .ok_or_else(|| ServiceError::NotFound("Membership not found".to_string()))?;
    membership.role = role;
    let updated = membership.clone();
    storage.save_memberships(workspace_id, &memberships)?;

    enrich(storage, updated)
}

// Managers remove anyone but the owner; members may also leave on their own
pub fn remove_member(
    state: &AppState,
    user_id: &str,
    workspace_id: &str,
    target_user_id: &str,
) -> Result<(), ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let workspace = load_workspace(storage, workspace_id)?;
    if target_user_id == workspace.owner_id {
        return Err(ServiceError::BadRequest(
            "The workspace owner cannot be removed.".to_string(),
        ));
    }
    if target_user_id == user_id {
        require_member(storage, workspace_id, user_id)?;
    } else {
        require_permission(storage, workspace_id, user_id, Permission::ManageMembers)?;
    }

    let mut memberships = storage.get_memberships(workspace_id)?;
    let before = memberships.len();
    memberships.retain(|m| m.user_id != target_user_id);
    if memberships.len() == before {
        return Err(ServiceError::NotFound("Membership not found".to_string()));
    }
    storage.save_memberships(workspace_id, &memberships)?;

    info!("✅ Removed {} from workspace {}", target_user_id, workspace_id);
    Ok(())
}
