// src/client/editor.rs
use crate::client::gateway::ApiClient;
use crate::client::session::SessionStore;
use crate::client::ClientError;
use crate::models::{CollaboratorOut, ContentType, Document, DocumentOut, DocumentRole, DocumentUpdate};
use crate::rich_text::{
    from_plain_text, to_plain_text, BlockType, DocumentStyles, FormatState, Mark, Position,
    RichDocument, Selection, TextAlign,
};
use chrono::{DateTime, Utc};
use log::info;

pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// Body of an open document, in whichever form the editor works with.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorContent {
    Plain(String),
    Html(String),
    Structured(RichDocument),
}

impl EditorContent {
    fn from_document(document: &Document) -> Self {
        match (&document.content_blocks, document.content_type) {
            (Some(blocks), _) => EditorContent::Structured(RichDocument::new(blocks.clone())),
            (None, ContentType::Structured) => {
                EditorContent::Structured(from_plain_text(&document.content))
            }
            (None, ContentType::Html) => EditorContent::Html(document.content.clone()),
            (None, _) => EditorContent::Plain(document.content.clone()),
        }
    }
}

// Empty titles are saved under a placeholder
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

// Linear scan of the collaborator list for the user's entry
pub fn resolve_role(collaborators: &[CollaboratorOut], user_id: &str) -> Option<DocumentRole> {
    collaborators
        .iter()
        .find(|c| c.user_id == user_id)
        .map(|c| c.role)
}

/// Local state of one open document: what is shown, whether it differs
/// from the last save, and what the current user may do with it.
#[derive(Debug, Clone)]
pub struct DocumentEditor {
    document_id: String,
    title: String,
    content: EditorContent,
    styles: Option<DocumentStyles>,
    role: Option<DocumentRole>,
    dirty: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl DocumentEditor {
    pub fn new(
        document_id: &str,
        title: &str,
        content: EditorContent,
        role: Option<DocumentRole>,
    ) -> Self {
        Self {
            document_id: document_id.to_string(),
            title: title.to_string(),
            content,
            styles: None,
            role,
            dirty: false,
            last_saved_at: None,
        }
    }

    pub fn from_document(
        document: &Document,
        collaborators: &[CollaboratorOut],
        user_id: &str,
    ) -> Self {
        let role = if document.owner_id == user_id {
            Some(DocumentRole::Owner)
        } else {
            resolve_role(collaborators, user_id)
        };
        Self {
            document_id: document.id.clone(),
            title: document.title.clone(),
            content: EditorContent::from_document(document),
            styles: document.styles.clone(),
            role,
            dirty: false,
            last_saved_at: Some(document.updated_at),
        }
    }

    // Fetch the document and its collaborators for the signed-in user
    pub async fn open(client: &ApiClient, document_id: &str) -> Result<Self, ClientError> {
        let DocumentOut { document, role } = client.get_document(document_id).await?;
        let collaborators = client.collaborators(document_id).await?;
        let user_id = client
            .session()
            .load()?
            .user
            .map(|user| user.id)
            .ok_or_else(ClientError::session_expired)?;

        let mut editor = Self::from_document(&document, &collaborators, &user_id);
        if editor.role.is_none() {
            // Access through a workspace membership only
            editor.role = role;
        }
        Ok(editor)
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &EditorContent {
        &self.content
    }

    pub fn role(&self) -> Option<DocumentRole> {
        self.role
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn can_edit(&self) -> bool {
        self.role.map_or(false, |role| role.can_edit())
    }

    pub fn can_delete(&self) -> bool {
        self.role == Some(DocumentRole::Owner)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Decide whether the user may navigate away. `confirm` is only asked
    /// when there are unsaved changes.
    pub fn confirm_leave<F: FnOnce() -> bool>(&self, confirm: F) -> bool {
        !self.dirty || confirm()
    }

    fn require_edit(&self) -> Result<(), ClientError> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(ClientError::ReadOnly)
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), ClientError> {
        self.require_edit()?;
        self.title = title.to_string();
        self.dirty = true;
        Ok(())
    }

    pub fn set_content(&mut self, content: EditorContent) -> Result<(), ClientError> {
        self.require_edit()?;
        self.content = content;
        self.dirty = true;
        Ok(())
    }

    pub fn set_styles(&mut self, styles: DocumentStyles) -> Result<(), ClientError> {
        self.require_edit()?;
        styles.validate().map_err(ClientError::Invalid)?;
        self.styles = Some(styles);
        self.dirty = true;
        Ok(())
    }

    // Plain bodies are promoted to the structured model on first formatting
    fn rich_mut(&mut self) -> Result<&mut RichDocument, ClientError> {
        self.require_edit()?;
        if let EditorContent::Plain(text) = &self.content {
            self.content = EditorContent::Structured(from_plain_text(text));
        }
        match &mut self.content {
            EditorContent::Structured(document) => {
                self.dirty = true;
                Ok(document)
            }
            _ => Err(ClientError::Invalid(
                "Formatting is only available for structured documents".to_string(),
            )),
        }
    }

    pub fn toggle_mark(&mut self, selection: Selection, mark: Mark) -> Result<(), ClientError> {
        self.rich_mut()?.toggle_mark(selection, mark);
        Ok(())
    }

    pub fn set_font_size(&mut self, selection: Selection, size: u32) -> Result<(), ClientError> {
        self.rich_mut()?.set_font_size(selection, size);
        Ok(())
    }

    pub fn set_color(&mut self, selection: Selection, color: Option<String>) -> Result<(), ClientError> {
        self.rich_mut()?.set_color(selection, color);
        Ok(())
    }

    pub fn set_alignment(&mut self, selection: Selection, alignment: TextAlign) -> Result<(), ClientError> {
        self.rich_mut()?.set_alignment(selection, alignment);
        Ok(())
    }

    pub fn toggle_block_type(
        &mut self,
        selection: Selection,
        block_type: BlockType,
    ) -> Result<(), ClientError> {
        self.rich_mut()?.toggle_block_type(selection, block_type);
        Ok(())
    }

    pub fn insert_text(&mut self, position: Position, text: &str) -> Result<Position, ClientError> {
        Ok(self.rich_mut()?.insert_text(position, text))
    }

    pub fn split_block(&mut self, position: Position) -> Result<Position, ClientError> {
        Ok(self.rich_mut()?.split_block(position))
    }

    pub fn delete_range(&mut self, selection: Selection) -> Result<Position, ClientError> {
        Ok(self.rich_mut()?.delete_range(selection))
    }

    // Toolbar state; None for plain and HTML bodies
    pub fn format_state(&self, selection: Selection) -> Option<FormatState> {
        match &self.content {
            EditorContent::Structured(document) => Some(document.format_state(selection)),
            _ => None,
        }
    }

    /// Whole-document payload pushed on save.
    pub fn payload(&self) -> DocumentUpdate {
        let (content, content_type, content_blocks) = match &self.content {
            EditorContent::Plain(text) => (text.clone(), ContentType::Plain, None),
            EditorContent::Html(html) => (html.clone(), ContentType::Html, None),
            EditorContent::Structured(document) => (
                to_plain_text(document),
                ContentType::Structured,
                Some(document.blocks.clone()),
            ),
        };
        DocumentUpdate {
            title: Some(normalize_title(&self.title)),
            content: Some(content),
            content_type: Some(content_type),
            content_blocks,
            styles: self.styles.clone(),
        }
    }

    pub async fn save(&mut self, client: &ApiClient) -> Result<DocumentOut, ClientError> {
        self.require_edit()?;
        let saved = client
            .update_document(&self.document_id, &self.payload())
            .await?;

        self.title = saved.document.title.clone();
        self.dirty = false;
        self.last_saved_at = Some(Utc::now());
        info!("💾 Saved document {}", self.document_id);
        Ok(saved)
    }

    // The caller drops the editor once this succeeds
    pub async fn delete(&self, client: &ApiClient) -> Result<(), ClientError> {
        if !self.can_delete() {
            return Err(ClientError::ReadOnly);
        }
        client.delete_document(&self.document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::TextBlock;

    fn collaborator(user_id: &str, role: DocumentRole) -> CollaboratorOut {
        CollaboratorOut {
            id: format!("c-{}", user_id),
            document_id: "doc".to_string(),
            user_id: user_id.to_string(),
            role,
            username: None,
            email: None,
        }
    }

    fn editor_with(role: DocumentRole) -> DocumentEditor {
        DocumentEditor::new("doc", "Notes", EditorContent::Plain("hello".to_string()), Some(role))
    }

    #[test]
    fn role_is_found_by_user_id() {
        let list = vec![
            collaborator("owner", DocumentRole::Owner),
            collaborator("bob", DocumentRole::Reader),
        ];
        assert_eq!(resolve_role(&list, "bob"), Some(DocumentRole::Reader));
        assert_eq!(resolve_role(&list, "carol"), None);
    }

    #[test]
    fn blank_title_saves_as_untitled() {
        let mut editor = editor_with(DocumentRole::Editor);
        editor.set_title("   ").unwrap();
        assert_eq!(editor.payload().title.as_deref(), Some(UNTITLED_DOCUMENT));
    }

    #[test]
    fn reader_cannot_edit_save_or_delete() {
        let mut editor = editor_with(DocumentRole::Reader);
        assert!(!editor.can_edit());
        assert!(!editor.can_delete());
        assert_eq!(editor.set_title("x"), Err(ClientError::ReadOnly));
        assert!(!editor.has_unsaved_changes());
    }

    #[test]
    fn editor_role_edits_but_does_not_delete() {
        let editor = editor_with(DocumentRole::Editor);
        assert!(editor.can_edit());
        assert!(!editor.can_delete());
        assert!(editor_with(DocumentRole::Owner).can_delete());
    }

    #[test]
    fn mutations_mark_dirty_and_leave_asks_for_confirmation() {
        let mut editor = editor_with(DocumentRole::Owner);
        assert!(editor.confirm_leave(|| false));

        editor.set_content(EditorContent::Plain("changed".to_string())).unwrap();
        assert!(editor.has_unsaved_changes());
        assert!(!editor.confirm_leave(|| false));
        assert!(editor.confirm_leave(|| true));
    }

    #[test]
    fn formatting_promotes_plain_text_to_structured() {
        let mut editor = editor_with(DocumentRole::Editor);
        editor
            .toggle_mark(Selection::within(0, 0, 5), Mark::Bold)
            .unwrap();

        let state = editor.format_state(Selection::within(0, 0, 5)).unwrap();
        assert!(state.bold);
        let payload = editor.payload();
        assert_eq!(payload.content_type, Some(ContentType::Structured));
        assert_eq!(payload.content.as_deref(), Some("hello"));
    }

    #[test]
    fn formatting_keeps_blank_lines_and_trailing_newline() {
        let body = "intro\r\n\nlast line\n";
        let mut editor = DocumentEditor::new(
            "doc",
            "Notes",
            EditorContent::Plain(body.to_string()),
            Some(DocumentRole::Owner),
        );
        editor
            .toggle_mark(Selection::within(0, 0, 5), Mark::Bold)
            .unwrap();
        assert_eq!(editor.payload().content.as_deref(), Some(body));
    }

    #[test]
    fn html_bodies_cannot_be_formatted() {
        let mut editor = DocumentEditor::new(
            "doc",
            "Notes",
            EditorContent::Html("<p>hi</p>".to_string()),
            Some(DocumentRole::Owner),
        );
        assert!(matches!(
            editor.toggle_mark(Selection::within(0, 0, 1), Mark::Italic),
            Err(ClientError::Invalid(_))
        ));
    }

    #[test]
    fn owner_is_resolved_from_document_even_without_entry() {
        let now = Utc::now();
        let document = Document {
            id: "doc".to_string(),
            title: "Plan".to_string(),
            content: String::new(),
            content_type: ContentType::Structured,
            content_blocks: Some(vec![TextBlock::paragraph("x")]),
            styles: None,
            owner_id: "owner".to_string(),
            workspace_id: None,
            created_at: now,
            updated_at: now,
        };
        let editor = DocumentEditor::from_document(&document, &[], "owner");
        assert!(editor.can_delete());
        assert!(matches!(editor.content(), EditorContent::Structured(_)));
        assert!(!editor.has_unsaved_changes());
    }
}
