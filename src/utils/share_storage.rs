// src/utils/share_storage.rs
use crate::models::{ServiceError, ShareLink};
use crate::utils::storage::{Storage, SHARE_LINKS};
use log::info;

impl Storage {
    pub fn save_share_link(&self, link: &ShareLink) -> Result<(), ServiceError> {
        self.write_record(SHARE_LINKS, &link.token, link)?;
        info!("✅ Saved share link for document: {}", link.document_id);
        Ok(())
    }

    pub fn find_share_link(&self, token: &str) -> Result<Option<ShareLink>, ServiceError> {
        self.read_record(SHARE_LINKS, token)
    }

    pub fn share_links_for_document(&self, document_id: &str) -> Result<Vec<ShareLink>, ServiceError> {
        Ok(self
            .list_records::<ShareLink>(SHARE_LINKS)?
            .into_iter()
            .filter(|link| link.document_id == document_id)
            .collect())
    }

    pub fn share_links_created_by(&self, user_id: &str) -> Result<Vec<ShareLink>, ServiceError> {
        Ok(self
            .list_records::<ShareLink>(SHARE_LINKS)?
            .into_iter()
            .filter(|link| link.created_by == user_id)
            .collect())
    }

    // Delete all share links for a document
    pub fn delete_document_share_links(&self, document_id: &str) -> Result<usize, ServiceError> {
        let mut deleted_count = 0;
        for link in self.share_links_for_document(document_id)? {
            if self.delete_record(SHARE_LINKS, &link.token)? {
                deleted_count += 1;
            }
        }
        info!("✅ Deleted {} share links for document: {}", deleted_count, document_id);
        Ok(deleted_count)
    }
}
