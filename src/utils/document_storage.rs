// src/utils/document_storage.rs
use crate::models::{Collaborator, Document, ServiceError};
use crate::utils::storage::{Storage, COLLABORATORS, DOCUMENTS};
use log::info;

impl Storage {
    pub fn save_document(&self, document: &Document) -> Result<(), ServiceError> {
        self.write_record(DOCUMENTS, &document.id, document)
    }

    pub fn find_document_by_id(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        self.read_record(DOCUMENTS, id)
    }

    pub fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        self.list_records(DOCUMENTS)
    }

    // Removes the document together with its collaborator list
    pub fn delete_document_record(&self, id: &str) -> Result<bool, ServiceError> {
        self.delete_record(COLLABORATORS, id)?;
        let deleted = self.delete_record(DOCUMENTS, id)?;
        if deleted {
            info!("✅ Deleted document: {}", id);
        }
        Ok(deleted)
    }

    // Collaborators are stored as one list per document
    pub fn get_collaborators(&self, document_id: &str) -> Result<Vec<Collaborator>, ServiceError> {
        Ok(self
            .read_record::<Vec<Collaborator>>(COLLABORATORS, document_id)?
            .unwrap_or_default())
    }

    pub fn save_collaborators(
        &self,
        document_id: &str,
        collaborators: &[Collaborator],
    ) -> Result<(), ServiceError> {
        self.write_record(COLLABORATORS, document_id, &collaborators)
    }

    pub fn find_collaborator(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Option<Collaborator>, ServiceError> {
        Ok(self
            .get_collaborators(document_id)?
            .into_iter()
            .find(|c| c.user_id == user_id))
    }

    // Every collaborator entry held by a user, across all documents
    pub fn collaborations_for_user(&self, user_id: &str) -> Result<Vec<Collaborator>, ServiceError> {
        Ok(self
            .list_records::<Vec<Collaborator>>(COLLABORATORS)?
            .into_iter()
            .flatten()
            .filter(|c| c.user_id == user_id)
            .collect())
    }
}
