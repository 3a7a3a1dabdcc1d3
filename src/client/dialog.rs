// src/client/dialog.rs
use crate::client::ClientError;
use std::future::Future;

/// State of one modal dialog (create, delete, share, collaborators).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
    Submitting,
    Failed(String),
}

impl DialogState {
    pub fn open(&mut self) {
        if !self.is_submitting() {
            *self = DialogState::Open;
        }
    }

    // Refused while a submit is in flight
    pub fn close(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        *self = DialogState::Closed;
        true
    }

    /// Enter `Submitting`. Returns false if the dialog is closed or already
    /// submitting, so double clicks send one request.
    pub fn begin_submit(&mut self) -> bool {
        match self {
            DialogState::Open | DialogState::Failed(_) => {
                *self = DialogState::Submitting;
                true
            }
            DialogState::Closed | DialogState::Submitting => false,
        }
    }

    pub fn succeed(&mut self) {
        if self.is_submitting() {
            *self = DialogState::Closed;
        }
    }

    pub fn fail(&mut self, message: &str) {
        if self.is_submitting() {
            *self = DialogState::Failed(message.to_string());
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, DialogState::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DialogState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Run one submit through the dialog: closes on success, keeps the
    /// dialog open with the error message on failure. Returns None when the
    /// submit was refused or failed.
    pub async fn submit<T, F>(&mut self, action: F) -> Option<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if !self.begin_submit() {
            return None;
        }
        match action.await {
            Ok(value) => {
                self.succeed();
                Some(value)
            }
            Err(e) => {
                self.fail(&e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_cycle_closes_on_success() {
        let mut dialog = DialogState::default();
        assert!(!dialog.begin_submit());

        dialog.open();
        assert!(dialog.begin_submit());
        assert!(!dialog.begin_submit());
        assert!(!dialog.close());

        dialog.succeed();
        assert_eq!(dialog, DialogState::Closed);
    }

    #[test]
    fn failure_keeps_dialog_open_for_retry() {
        let mut dialog = DialogState::Open;
        dialog.begin_submit();
        dialog.fail("Only owner can create share links");

        assert!(dialog.is_open());
        assert_eq!(dialog.error(), Some("Only owner can create share links"));
        assert!(dialog.begin_submit());
    }

    #[actix_rt::test]
    async fn submit_reports_client_errors() {
        let mut dialog = DialogState::Open;
        let result: Option<()> = dialog.submit(async { Err(ClientError::ReadOnly) }).await;
        assert_eq!(result, None);
        assert_eq!(
            dialog.error(),
            Some("You have read-only access to this document")
        );

        let value = dialog.submit(async { Ok::<_, ClientError>(7) }).await;
        assert_eq!(value, Some(7));
        assert_eq!(dialog, DialogState::Closed);
    }
}
