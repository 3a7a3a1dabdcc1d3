// src/client/documents.rs
use crate::client::gateway::ApiClient;
use crate::client::ClientError;
use crate::models::{
    CollaboratorAdd, CollaboratorOut, CollaboratorUpdateRole, DocumentCreate, DocumentOut,
    DocumentRole, DocumentUpdate, ShareLinkCreate, ShareLinkOut, UserStats,
};
use serde_json::json;

impl ApiClient {
    pub async fn list_documents(
        &self,
        skip: usize,
        limit: usize,
        search: Option<&str>,
    ) -> Result<Vec<DocumentOut>, ClientError> {
        let mut query = vec![("skip", skip.to_string()), ("limit", limit.to_string())];
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        self.get_with_query("/documents", &query).await
    }

    pub async fn search_documents(&self, q: &str) -> Result<Vec<DocumentOut>, ClientError> {
        self.get_with_query("/documents/search", &[("q", q.to_string())])
            .await
    }

    pub async fn get_document(&self, document_id: &str) -> Result<DocumentOut, ClientError> {
        self.get(&format!("/documents/{}", document_id)).await
    }

    pub async fn create_document(&self, data: &DocumentCreate) -> Result<DocumentOut, ClientError> {
        self.post("/documents", data).await
    }

    pub async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<DocumentOut, ClientError> {
        self.put(&format!("/documents/{}", document_id), update).await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/documents/{}", document_id)).await
    }

    // `format` is "txt" or "html"
    pub async fn export_document(
        &self,
        document_id: &str,
        format: &str,
    ) -> Result<String, ClientError> {
        self.get_text(&format!("/documents/{}/export/{}", document_id, format))
            .await
    }

    pub async fn collaborators(&self, document_id: &str) -> Result<Vec<CollaboratorOut>, ClientError> {
        self.get(&format!("/documents/{}/collaborators", document_id))
            .await
    }

    pub async fn add_collaborator(
        &self,
        document_id: &str,
        request: &CollaboratorAdd,
    ) -> Result<CollaboratorOut, ClientError> {
        self.post(&format!("/documents/{}/collaborators", document_id), request)
            .await
    }

    pub async fn update_collaborator_role(
        &self,
        document_id: &str,
        user_id: &str,
        role: DocumentRole,
    ) -> Result<CollaboratorOut, ClientError> {
        self.put(
            &format!("/documents/{}/collaborators/{}", document_id, user_id),
            &CollaboratorUpdateRole { role },
        )
        .await
    }

    pub async fn remove_collaborator(&self, document_id: &str, user_id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/documents/{}/collaborators/{}", document_id, user_id))
            .await
    }

    pub async fn create_share_link(
        &self,
        document_id: &str,
        request: &ShareLinkCreate,
    ) -> Result<ShareLinkOut, ClientError> {
        self.post(&format!("/documents/{}/share", document_id), request)
            .await
    }

    pub async fn share_links(&self, document_id: &str) -> Result<Vec<ShareLinkOut>, ClientError> {
        self.get(&format!("/documents/{}/share", document_id)).await
    }

    pub async fn revoke_share_link(&self, document_id: &str, token: &str) -> Result<(), ClientError> {
        self.delete(&format!("/documents/{}/share/{}", document_id, token))
            .await
    }

    pub async fn accept_share_link(&self, token: &str) -> Result<CollaboratorOut, ClientError> {
        self.post(&format!("/documents/share/{}/accept", token), &json!({}))
            .await
    }

    pub async fn my_stats(&self) -> Result<UserStats, ClientError> {
        self.get("/users/me/stats").await
    }
}
