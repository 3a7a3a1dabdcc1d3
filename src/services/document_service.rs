// src/services/document_service.rs
use crate::models::{
    Collaborator, ContentType, Document, DocumentCreate, DocumentOut, DocumentRole, DocumentUpdate,
    Permission, ServiceError, UserStats,
};
use crate::rich_text::render::escape_html;
use crate::rich_text::{from_plain_text, to_html, to_plain_text, RichDocument};
use crate::services::{load_document, resolve_access, DocumentAccess};
use crate::utils::validation::{MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH};
use crate::utils::Storage;
use crate::AppState;
use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_SEARCH_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "html" => Ok(ExportFormat::Html),
            other => Err(ServiceError::BadRequest(format!(
                "Unsupported export format: {}",
                other
            ))),
        }
    }
}

pub struct ExportedDocument {
    pub filename: String,
    pub format: ExportFormat,
    pub body: String,
}

// Page window; limit must be within 1..=100
pub fn page(skip: Option<usize>, limit: Option<usize>) -> Result<(usize, usize), ServiceError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > DEFAULT_LIMIT {
        return Err(ServiceError::BadRequest(format!(
            "limit must be between 1 and {}",
            DEFAULT_LIMIT
        )));
    }
    Ok((skip.unwrap_or(0), limit))
}

fn validate_title(title: &str) -> Result<String, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::BadRequest(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<(), ServiceError> {
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ServiceError::BadRequest(format!(
            "Content cannot exceed {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

fn ensure_unique_title(
    storage: &Storage,
    owner_id: &str,
    title: &str,
    except_id: Option<&str>,
) -> Result<(), ServiceError> {
    let taken = storage.list_documents()?.iter().any(|doc| {
        doc.owner_id == owner_id && doc.title == title && Some(doc.id.as_str()) != except_id
    });
    if taken {
        return Err(ServiceError::BadRequest(format!(
            "Document with title '{}' already exists",
            title
        )));
    }
    Ok(())
}

// Plain text of a document, whichever representation it carries
fn document_text(document: &Document) -> String {
    match &document.content_blocks {
        Some(blocks) => to_plain_text(&RichDocument::new(blocks.clone())),
        None => document.content.clone(),
    }
}

fn matches_query(document: &Document, query: &str) -> bool {
    let query = query.to_lowercase();
    document.title.to_lowercase().contains(&query)
        || document.content.to_lowercase().contains(&query)
        || (document.content_blocks.is_some()
            && document_text(document).to_lowercase().contains(&query))
}

pub fn create_document(
    state: &AppState,
    owner_id: &str,
    data: DocumentCreate,
    workspace_id: Option<&str>,
) -> Result<Document, ServiceError> {
    let title = validate_title(&data.title)?;
    let content = data.content.unwrap_or_default();
    validate_content(&content)?;
    if let Some(styles) = &data.styles {
        styles.validate().map_err(ServiceError::BadRequest)?;
    }

    let storage = &state.storage;
    let _guard = storage.lock()?;

    if let Some(workspace_id) = workspace_id {
        storage
            .find_workspace_by_id(workspace_id)?
            .ok_or_else(|| ServiceError::NotFound("Workspace not found".to_string()))?;
        let membership = storage
            .find_membership(workspace_id, owner_id)?
            .ok_or_else(|| ServiceError::Forbidden("Not a member of this workspace.".to_string()))?;
        if !membership.role.allows(Permission::CreateDocument) {
            return Err(ServiceError::Forbidden(
                "Permission 'create_document' denied.".to_string(),
            ));
        }
    }

    ensure_unique_title(storage, owner_id, &title, None)?;

    let content_type = match (data.content_type, &data.content_blocks) {
        (Some(content_type), _) => content_type,
        (None, Some(_)) => ContentType::Structured,
        (None, None) => ContentType::Plain,
    };
    let now = Utc::now();
    let document = Document {
        id: Uuid::new_v4().to_string(),
        title,
        content,
        content_type,
        content_blocks: data.content_blocks,
        styles: data.styles,
        owner_id: owner_id.to_string(),
        workspace_id: workspace_id.map(str::to_string),
        created_at: now,
        updated_at: now,
    };
    storage.save_document(&document)?;
    storage.save_collaborators(
        &document.id,
        &[Collaborator::new(&document.id, owner_id, DocumentRole::Owner)],
    )?;

    info!("✅ Document created: {} by {}", document.id, owner_id);
    Ok(document)
}

pub fn get_document(state: &AppState, user_id: &str, id: &str) -> Result<DocumentOut, ServiceError> {
    let document = load_document(&state.storage, id)?;
    let access = resolve_access(&state.storage, &document, user_id)?;
    if !access.has_any() {
        return Err(ServiceError::Forbidden(
            "Not authorized to access this document".to_string(),
        ));
    }
    Ok(DocumentOut {
        role: access.role(),
        document,
    })
}

/// Documents the user can open, newest first, optionally filtered.
pub fn list_documents(
    state: &AppState,
    user_id: &str,
    skip: usize,
    limit: usize,
    search: Option<&str>,
) -> Result<Vec<DocumentOut>, ServiceError> {
    let storage = &state.storage;
    let collaborations: HashMap<String, DocumentRole> = storage
        .collaborations_for_user(user_id)?
        .into_iter()
        .map(|c| (c.document_id, c.role))
        .collect();
    let memberships: HashMap<String, _> = storage
        .memberships_for_user(user_id)?
        .into_iter()
        .map(|m| (m.workspace_id, m.role))
        .collect();

    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let mut documents: Vec<DocumentOut> = storage
        .list_documents()?
        .into_iter()
        .filter_map(|document| {
            let access = DocumentAccess {
                collaborator: collaborations.get(&document.id).copied().or(
                    (document.owner_id == user_id).then_some(DocumentRole::Owner),
                ),
                workspace: document
                    .workspace_id
                    .as_ref()
                    .and_then(|id| memberships.get(id).copied()),
            };
            if !access.has_any() {
                return None;
            }
            if let Some(query) = search {
                if !matches_query(&document, query) {
                    return None;
                }
            }
            Some(DocumentOut {
                role: access.role(),
                document,
            })
        })
        .collect();

    documents.sort_by(|a, b| b.document.updated_at.cmp(&a.document.updated_at));
    debug!("Listing {} documents for user {}", documents.len(), user_id);
    Ok(documents.into_iter().skip(skip).take(limit).collect())
}

pub fn search_documents(
    state: &AppState,
    user_id: &str,
    query: &str,
    skip: usize,
    limit: usize,
) -> Result<Vec<DocumentOut>, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::BadRequest("Search query cannot be empty".to_string()));
    }
    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ServiceError::BadRequest(format!(
            "Search query cannot exceed {} characters",
            MAX_SEARCH_LENGTH
        )));
    }
    list_documents(state, user_id, skip, limit, Some(query))
}

// Overwrites the supplied fields; the last save wins
pub fn update_document(
    state: &AppState,
    user_id: &str,
    id: &str,
    update: DocumentUpdate,
) -> Result<DocumentOut, ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let mut document = load_document(storage, id)?;
    let access = resolve_access(storage, &document, user_id)?;
    if !access.has_any() {
        return Err(ServiceError::Forbidden(
            "Access denied. You are not a collaborator on this document.".to_string(),
        ));
    }
    if !access.allows(Permission::EditDocument) {
        return Err(ServiceError::Forbidden(
            "Access denied. Readers cannot edit documents. Required role: owner or editor."
                .to_string(),
        ));
    }
    if update.is_empty() {
        return Err(ServiceError::BadRequest("No fields to update".to_string()));
    }

    if let Some(title) = &update.title {
        let title = validate_title(title)?;
        if title != document.title {
            ensure_unique_title(storage, &document.owner_id, &title, Some(&document.id))?;
        }
        document.title = title;
    }
    if let Some(content) = update.content {
        validate_content(&content)?;
        document.content = content;
    }
    if let Some(styles) = update.styles {
        styles.validate().map_err(ServiceError::BadRequest)?;
        document.styles = Some(styles);
    }
    if let Some(blocks) = update.content_blocks {
        document.content_blocks = Some(blocks);
        if update.content_type.is_none() {
            document.content_type = ContentType::Structured;
        }
    }
    if let Some(content_type) = update.content_type {
        document.content_type = content_type;
    }
    document.updated_at = Utc::now();
    storage.save_document(&document)?;

    info!("✅ Document updated: {} by {}", document.id, user_id);
    Ok(DocumentOut {
        role: access.role(),
        document,
    })
}

pub fn delete_document(state: &AppState, user_id: &str, id: &str) -> Result<(), ServiceError> {
    let storage = &state.storage;
    let _guard = storage.lock()?;

    let document = load_document(storage, id)?;
    let access = resolve_access(storage, &document, user_id)?;
    if !access.has_any() {
        return Err(ServiceError::Forbidden(
            "Access denied. You are not a collaborator on this document.".to_string(),
        ));
    }
    if !access.allows(Permission::DeleteDocument) {
        return Err(ServiceError::Forbidden(format!(
            "Access denied. Only the document owner can delete documents. Your role: {}",
            access.role_name()
        )));
    }

    remove_document(storage, &document.id)?;
    info!("🗑️ Document deleted: {} by {}", document.id, user_id);
    Ok(())
}

// Document, collaborator list and share links; caller holds the lock
pub(crate) fn remove_document(storage: &Storage, id: &str) -> Result<(), ServiceError> {
    storage.delete_document_share_links(id)?;
    storage.delete_document_record(id)?;
    Ok(())
}

pub fn workspace_documents(
    state: &AppState,
    user_id: &str,
    workspace_id: &str,
) -> Result<Vec<DocumentOut>, ServiceError> {
    let storage = &state.storage;
    storage
        .find_workspace_by_id(workspace_id)?
        .ok_or_else(|| ServiceError::NotFound("Workspace not found".to_string()))?;
    let membership = storage
        .find_membership(workspace_id, user_id)?
        .ok_or_else(|| ServiceError::Forbidden("Not a member of this workspace.".to_string()))?;
    if !membership.role.allows(Permission::ViewDocument) {
        return Err(ServiceError::Forbidden(
            "Permission 'view_document' denied.".to_string(),
        ));
    }

    let mut documents = Vec::new();
    for document in storage.list_documents()? {
        if document.workspace_id.as_deref() != Some(workspace_id) {
            continue;
        }
        let access = resolve_access(storage, &document, user_id)?;
        documents.push(DocumentOut {
            role: access.role(),
            document,
        });
    }
    documents.sort_by(|a, b| b.document.updated_at.cmp(&a.document.updated_at));
    Ok(documents)
}

pub fn export_document(
    state: &AppState,
    user_id: &str,
    id: &str,
    format: ExportFormat,
) -> Result<ExportedDocument, ServiceError> {
    let document = get_document(state, user_id, id)?.document;
    let body = match format {
        ExportFormat::Txt => document_text(&document),
        ExportFormat::Html => {
            let inner = match (&document.content_blocks, document.content_type) {
                (Some(blocks), _) => to_html(&RichDocument::new(blocks.clone())),
                (None, ContentType::Html) => document.content.clone(),
                (None, _) => to_html(&from_plain_text(&document.content)),
            };
            format!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
                escape_html(&document.title),
                inner
            )
        }
    };

    Ok(ExportedDocument {
        filename: format!("{}.{}", export_stem(&document.title), format.extension()),
        format,
        body,
    })
}

// Title reduced to characters safe in a Content-Disposition filename
fn export_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    if stem.trim_matches('_').is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

pub fn user_stats(state: &AppState, user_id: &str) -> Result<UserStats, ServiceError> {
    let storage = &state.storage;
    let collaborations = storage.collaborations_for_user(user_id)?;
    let owned_documents = storage
        .list_documents()?
        .iter()
        .filter(|doc| doc.owner_id == user_id)
        .count();
    let shared_links = storage
        .share_links_created_by(user_id)?
        .iter()
        .filter(|link| link.is_active)
        .count();

    Ok(UserStats {
        total_documents: collaborations.len(),
        owned_documents,
        collaborations: collaborations
            .iter()
            .filter(|c| c.role != DocumentRole::Owner)
            .count(),
        shared_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_format_parses_known_extensions() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn export_stem_strips_unsafe_characters() {
        assert_eq!(export_stem("Q3 plan/draft"), "Q3_plan_draft");
        assert_eq!(export_stem("???"), "document");
    }

    #[test]
    fn page_limit_is_bounded() {
        assert_eq!(page(None, None).unwrap(), (0, 100));
        assert!(page(Some(0), Some(0)).is_err());
        assert!(page(Some(0), Some(101)).is_err());
    }

    #[test]
    fn titles_are_trimmed_and_bounded() {
        assert_eq!(validate_title("  Notes ").unwrap(), "Notes");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }
}
