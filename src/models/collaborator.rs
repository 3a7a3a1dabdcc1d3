// src/models/collaborator.rs
use crate::models::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Per-document role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    Reader = 0,
    Editor = 1,
    Owner = 2,
}

impl DocumentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Reader => "reader",
            DocumentRole::Editor => "editor",
            DocumentRole::Owner => "owner",
        }
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            DocumentRole::Owner => &[
                Permission::ViewDocument,
                Permission::EditDocument,
                Permission::DeleteDocument,
                Permission::ManageMembers,
            ],
            DocumentRole::Editor => &[Permission::ViewDocument, Permission::EditDocument],
            DocumentRole::Reader => &[Permission::ViewDocument],
        }
    }

    pub fn can_edit(&self) -> bool {
        self.permissions().contains(&Permission::EditDocument)
    }

    // Roles that can be handed out through collaborator dialogs or share links
    pub fn is_grantable(&self) -> bool {
        !matches!(self, DocumentRole::Owner)
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Collaborator {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub role: DocumentRole,
    pub created_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn new(document_id: &str, user_id: &str, role: DocumentRole) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: Utc::now(),
        }
    }
}

// Collaborator enriched with the user's name for listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CollaboratorOut {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub role: DocumentRole,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl CollaboratorOut {
    pub fn bare(collaborator: &Collaborator) -> Self {
        Self {
            id: collaborator.id.clone(),
            document_id: collaborator.document_id.clone(),
            user_id: collaborator.user_id.clone(),
            role: collaborator.role,
            username: None,
            email: None,
        }
    }
}

// Add a collaborator by id or by email
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CollaboratorAdd {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: DocumentRole,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CollaboratorUpdateRole {
    pub role: DocumentRole,
}
