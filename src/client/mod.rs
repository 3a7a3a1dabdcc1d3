//! Async client for the CollabDocs API.
//!
//! [`gateway::ApiClient`] owns the HTTP connection and the token refresh
//! policy; the other modules are typed calls and the local state a screen
//! keeps between them (open document, dialogs, session).
use derive_more::Display;

pub mod auth;
pub mod dialog;
pub mod documents;
pub mod editor;
pub mod gateway;
pub mod session;
pub mod workspaces;

pub use dialog::DialogState;
pub use editor::{DocumentEditor, EditorContent};
pub use gateway::ApiClient;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

// Where the user is sent once the session cannot be recovered
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Display, PartialEq)]
pub enum ClientError {
    #[display(fmt = "Network error: {}", _0)]
    Transport(String),
    #[display(fmt = "{} ({})", detail, status)]
    Api { status: u16, detail: String },
    #[display(fmt = "Session expired, sign in again at {}", redirect)]
    SessionExpired { redirect: String },
    #[display(fmt = "You have read-only access to this document")]
    ReadOnly,
    #[display(fmt = "{}", _0)]
    Invalid(String),
    #[display(fmt = "Session storage error: {}", _0)]
    Storage(String),
    #[display(fmt = "Unexpected response: {}", _0)]
    Decode(String),
}

impl std::error::Error for ClientError {}

impl ClientError {
    pub fn session_expired() -> Self {
        ClientError::SessionExpired {
            redirect: LOGIN_ROUTE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
