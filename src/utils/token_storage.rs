// src/utils/token_storage.rs
use crate::models::{RefreshTokenRecord, ResetTokenRecord, ServiceError};
use crate::utils::storage::{Storage, REFRESH_TOKENS, RESET_TOKENS};
use chrono::Utc;
use log::{debug, info};

impl Storage {
    pub fn save_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), ServiceError> {
        self.write_record(REFRESH_TOKENS, &record.jti, record)
    }

    pub fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, ServiceError> {
        self.read_record(REFRESH_TOKENS, jti)
    }

    pub fn delete_refresh_token(&self, jti: &str) -> Result<bool, ServiceError> {
        self.delete_record(REFRESH_TOKENS, jti)
    }

    pub fn delete_refresh_tokens_for_user(&self, user_id: &str) -> Result<usize, ServiceError> {
        let mut deleted_count = 0;
        for record in self.list_records::<RefreshTokenRecord>(REFRESH_TOKENS)? {
            if record.user_id == user_id && self.delete_record(REFRESH_TOKENS, &record.jti)? {
                deleted_count += 1;
            }
        }
        info!("✅ Revoked {} refresh tokens for user: {}", deleted_count, user_id);
        Ok(deleted_count)
    }

    pub fn save_reset_token(&self, record: &ResetTokenRecord) -> Result<(), ServiceError> {
        self.write_record(RESET_TOKENS, &record.token_hash, record)
    }

    pub fn find_reset_token(&self, token_hash: &str) -> Result<Option<ResetTokenRecord>, ServiceError> {
        self.read_record(RESET_TOKENS, token_hash)
    }

    pub fn delete_reset_token(&self, token_hash: &str) -> Result<bool, ServiceError> {
        self.delete_record(RESET_TOKENS, token_hash)
    }

    // Drop refresh and reset records past their expiry
    pub fn prune_expired_tokens(&self) -> Result<usize, ServiceError> {
        let now = Utc::now();
        let mut pruned = 0;
        for record in self.list_records::<RefreshTokenRecord>(REFRESH_TOKENS)? {
            if record.expires_at < now && self.delete_record(REFRESH_TOKENS, &record.jti)? {
                pruned += 1;
            }
        }
        for record in self.list_records::<ResetTokenRecord>(RESET_TOKENS)? {
            if record.expires_at < now && self.delete_record(RESET_TOKENS, &record.token_hash)? {
                pruned += 1;
            }
        }
        if pruned > 0 {
            info!("🧹 Pruned {} expired token records", pruned);
        } else {
            debug!("No expired token records to prune");
        }
        Ok(pruned)
    }
}
