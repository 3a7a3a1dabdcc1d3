// src/utils/workspace_storage.rs
use crate::models::{Membership, ServiceError, Workspace};
use crate::utils::storage::{Storage, MEMBERSHIPS, WORKSPACES};

impl Storage {
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), ServiceError> {
        self.write_record(WORKSPACES, &workspace.id, workspace)
    }

    pub fn find_workspace_by_id(&self, id: &str) -> Result<Option<Workspace>, ServiceError> {
        self.read_record(WORKSPACES, id)
    }

    pub fn list_workspaces(&self) -> Result<Vec<Workspace>, ServiceError> {
        self.list_records(WORKSPACES)
    }

    pub fn delete_workspace_record(&self, id: &str) -> Result<bool, ServiceError> {
        self.delete_record(MEMBERSHIPS, id)?;
        self.delete_record(WORKSPACES, id)
    }

    // Memberships are stored as one list per workspace
    pub fn get_memberships(&self, workspace_id: &str) -> Result<Vec<Membership>, ServiceError> {
        Ok(self
            .read_record::<Vec<Membership>>(MEMBERSHIPS, workspace_id)?
            .unwrap_or_default())
    }

    pub fn save_memberships(
        &self,
        workspace_id: &str,
        memberships: &[Membership],
    ) -> Result<(), ServiceError> {
        self.write_record(MEMBERSHIPS, workspace_id, &memberships)
    }

    pub fn find_membership(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<Membership>, ServiceError> {
        Ok(self
            .get_memberships(workspace_id)?
            .into_iter()
            .find(|m| m.user_id == user_id))
    }

    pub fn memberships_for_user(&self, user_id: &str) -> Result<Vec<Membership>, ServiceError> {
        Ok(self
            .list_records::<Vec<Membership>>(MEMBERSHIPS)?
            .into_iter()
            .flatten()
            .filter(|m| m.user_id == user_id)
            .collect())
    }
}
