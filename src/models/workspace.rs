// src/models/workspace.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateDocument,
    EditDocument,
    ViewDocument,
    DeleteDocument,
    ManageMembers,
}

// Roles seeded for every workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl WorkspaceRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            WorkspaceRole::Owner => &[
                Permission::CreateDocument,
                Permission::EditDocument,
                Permission::ViewDocument,
                Permission::DeleteDocument,
                Permission::ManageMembers,
            ],
            WorkspaceRole::Admin => &[
                Permission::CreateDocument,
                Permission::EditDocument,
                Permission::ViewDocument,
                Permission::DeleteDocument,
            ],
            WorkspaceRole::Editor => &[
                Permission::CreateDocument,
                Permission::EditDocument,
                Permission::ViewDocument,
            ],
            WorkspaceRole::Viewer => &[Permission::ViewDocument],
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Membership {
    pub id: String,
    pub workspace_id: String,
    pub user_id: String,
    pub role: WorkspaceRole,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(workspace_id: &str, user_id: &str, role: WorkspaceRole) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: Utc::now(),
        }
    }
}

// Membership enriched with the member's name for listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MembershipOut {
    #[serde(flatten)]
    pub membership: Membership,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkspaceData {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipCreate {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: WorkspaceRole,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipUpdate {
    pub role: WorkspaceRole,
}
