// src/client/workspaces.rs
use crate::client::gateway::ApiClient;
use crate::client::ClientError;
use crate::models::{
    DocumentCreate, DocumentOut, MembershipCreate, MembershipOut, MembershipUpdate, Workspace,
    WorkspaceData, WorkspaceRole,
};

impl ApiClient {
    pub async fn create_workspace(&self, name: &str) -> Result<Workspace, ClientError> {
        self.post(
            "/workspaces",
            &WorkspaceData {
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        self.get("/workspaces").await
    }

    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, ClientError> {
        self.get(&format!("/workspaces/{}", workspace_id)).await
    }

    pub async fn rename_workspace(&self, workspace_id: &str, name: &str) -> Result<Workspace, ClientError> {
        self.patch(
            &format!("/workspaces/{}", workspace_id),
            &WorkspaceData {
                name: name.to_string(),
            },
        )
        .await
    }

    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/workspaces/{}", workspace_id)).await
    }

    pub async fn workspace_documents(&self, workspace_id: &str) -> Result<Vec<DocumentOut>, ClientError> {
        self.get(&format!("/documents/workspace/{}", workspace_id))
            .await
    }

    pub async fn create_workspace_document(
        &self,
        workspace_id: &str,
        data: &DocumentCreate,
    ) -> Result<DocumentOut, ClientError> {
        self.post(&format!("/documents/workspace/{}", workspace_id), data)
            .await
    }

    pub async fn workspace_members(&self, workspace_id: &str) -> Result<Vec<MembershipOut>, ClientError> {
        self.get(&format!("/workspaces/{}/members", workspace_id))
            .await
    }

    pub async fn add_workspace_member(
        &self,
        workspace_id: &str,
        request: &MembershipCreate,
    ) -> Result<MembershipOut, ClientError> {
        self.post(&format!("/workspaces/{}/members", workspace_id), request)
            .await
    }

    pub async fn update_workspace_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<MembershipOut, ClientError> {
        self.patch(
            &format!("/workspaces/{}/members/{}", workspace_id, user_id),
            &MembershipUpdate { role },
        )
        .await
    }

    pub async fn remove_workspace_member(&self, workspace_id: &str, user_id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/workspaces/{}/members/{}", workspace_id, user_id))
            .await
    }
}
