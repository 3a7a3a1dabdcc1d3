// src/models/document.rs
use crate::models::DocumentRole;
use crate::rich_text::{DocumentStyles, TextBlock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Plain,
    Html,
    Markdown,
    Structured,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub content_blocks: Option<Vec<TextBlock>>,
    #[serde(default)]
    pub styles: Option<DocumentStyles>,
    pub owner_id: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DocumentCreate {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub content_blocks: Option<Vec<TextBlock>>,
    #[serde(default)]
    pub styles: Option<DocumentStyles>,
}

// Fields left out of the request are kept as stored
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DocumentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_blocks: Option<Vec<TextBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<DocumentStyles>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.content_type.is_none()
            && self.content_blocks.is_none()
            && self.styles.is_none()
    }
}

// Document as seen by one caller, with the caller's role
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentOut {
    #[serde(flatten)]
    pub document: Document,
    pub role: Option<DocumentRole>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}
