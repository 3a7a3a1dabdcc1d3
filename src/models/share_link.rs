// src/models/share_link.rs
use crate::models::DocumentRole;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub token: String,
    pub document_id: String,
    pub role: DocumentRole,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>, // None = never expires
    pub is_active: bool,
}

impl ShareLink {
    pub fn new(
        document_id: &str,
        role: DocumentRole,
        created_by: &str,
        expires_in_hours: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
            document_id: document_id.to_string(),
            role,
            created_by: created_by.to_string(),
            created_at: now,
            expires_at: expires_in_hours.map(|hours| now + Duration::hours(hours)),
            is_active: true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |expires| Utc::now() > expires)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ShareLinkCreate {
    pub role: DocumentRole,
    #[serde(default)]
    pub expires_in_hours: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShareLinkOut {
    pub token: String,
    pub role: DocumentRole,
    pub expires_at: Option<DateTime<Utc>>,
    pub share_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_without_expiry_never_expires() {
        let link = ShareLink::new("doc", DocumentRole::Reader, "owner", None);
        assert!(!link.is_expired());
        assert_eq!(link.token.len(), 32);
    }

    #[test]
    fn negative_window_is_already_expired() {
        let link = ShareLink::new("doc", DocumentRole::Editor, "owner", Some(-1));
        assert!(link.is_expired());
    }
}
