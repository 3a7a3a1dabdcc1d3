// src/utils/user_storage.rs
use crate::models::{ServiceError, User};
use crate::utils::storage::{Storage, USERS};

impl Storage {
    pub fn save_user(&self, user: &User) -> Result<(), ServiceError> {
        self.write_record(USERS, &user.id, user)
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        self.read_record(USERS, id)
    }

    // Emails compare case-insensitively
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .list_records::<User>(USERS)?
            .into_iter()
            .find(|user| user.email.to_lowercase() == email))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .list_records::<User>(USERS)?
            .into_iter()
            .find(|user| user.username.as_deref() == Some(username)))
    }
}
