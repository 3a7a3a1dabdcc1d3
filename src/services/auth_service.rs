// src/services/auth_service.rs
use crate::models::{
    LoginRequest, RegisterRequest, ResetTokenRecord, ServiceError, TokenResponse, TokenType, User,
    UserOut,
};
use crate::utils::validation::{validate_email, validate_password, validate_username};
use crate::utils::{hash_token, jwt, password};
use crate::AppState;
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

// Create a user account
pub fn register(state: &AppState, request: RegisterRequest) -> Result<User, ServiceError> {
    let email = request.email.trim().to_lowercase();
    validate_email(&email).map_err(ServiceError::BadRequest)?;
    validate_password(&request.password).map_err(ServiceError::BadRequest)?;
    let username = match request.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            validate_username(name).map_err(ServiceError::BadRequest)?;
            Some(name.to_string())
        }
        _ => None,
    };

    // Hash before taking the storage lock; bcrypt is slow on purpose
    let password_hash = password::hash_password(&request.password, state.settings.bcrypt_cost)?;

    let storage = &state.storage;
    let _guard = storage.lock()?;
    if storage.find_user_by_email(&email)?.is_some() {
        return Err(ServiceError::BadRequest(
            "User with this email already exists.".to_string(),
        ));
    }
    if let Some(name) = &username {
        if storage.find_user_by_username(name)?.is_some() {
            return Err(ServiceError::BadRequest("Username already taken.".to_string()));
        }
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        username,
        password_hash,
        is_active: true,
        created_at: Utc::now(),
    };
    storage.save_user(&user)?;
    info!("✅ User registered successfully: {}", user.id);
    Ok(user)
}

// Check credentials and hand out a token pair
pub fn login(state: &AppState, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
    let user = match state.storage.find_user_by_email(&request.email)? {
        Some(user) => user,
        None => {
            debug!("Login for unknown email: {}", request.email);
            return Err(ServiceError::Unauthorized);
        }
    };

    if !password::verify_password(&request.password, &user.password_hash)? {
        debug!("Invalid password for user: {}", user.id);
        return Err(ServiceError::Unauthorized);
    }

    if !user.is_active {
        return Err(ServiceError::Forbidden("Inactive user account".to_string()));
    }

    issue_tokens(state, &user)
}

fn issue_tokens(state: &AppState, user: &User) -> Result<TokenResponse, ServiceError> {
    let access_token = jwt::generate_access_token(user, &state.settings)?;
    let (refresh_token, record) = jwt::generate_refresh_token(user, &state.settings)?;
    state.storage.prune_expired_tokens()?;
    state.storage.save_refresh_token(&record)?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        user: UserOut::from(user),
    })
}

/// Exchange a refresh token for a new pair. The presented token is revoked,
/// so each refresh token works exactly once.
pub fn refresh(state: &AppState, refresh_token: &str) -> Result<TokenResponse, ServiceError> {
    let claims = jwt::decode_token(refresh_token, &state.settings, TokenType::Refresh)?;

    let storage = &state.storage;
    let _guard = storage.lock()?;
    let record = match storage.find_refresh_token(&claims.jti)? {
        Some(record) => record,
        None => {
            warn!("Refresh token reuse or revoked token for user: {}", claims.sub);
            return Err(ServiceError::Unauthorized);
        }
    };
    storage.delete_refresh_token(&record.jti)?;

    if record.expires_at < Utc::now() || record.user_id != claims.sub {
        return Err(ServiceError::Unauthorized);
    }

    let user = match storage.find_user_by_id(&record.user_id)? {
        Some(user) if user.is_active => user,
        _ => return Err(ServiceError::Unauthorized),
    };

    info!("🔄 Refreshed session for user: {}", user.id);
    issue_tokens(state, &user)
}

// Revoke the refresh token if one is presented; unknown tokens are ignored
pub fn logout(state: &AppState, refresh_token: Option<&str>) -> Result<(), ServiceError> {
    if let Some(token) = refresh_token {
        if let Ok(claims) = jwt::decode_token(token, &state.settings, TokenType::Refresh) {
            state.storage.delete_refresh_token(&claims.jti)?;
            info!("👋 User logged out: {}", claims.sub);
        }
    }
    Ok(())
}

/// Start a password reset. Returns the raw token when the account exists;
/// callers must not reveal whether it did.
pub fn request_password_reset(
    state: &AppState,
    email: &str,
) -> Result<Option<String>, ServiceError> {
    let user = match state.storage.find_user_by_email(email)? {
        Some(user) => user,
        None => {
            debug!("Password reset requested for unknown email");
            return Ok(None);
        }
    };

    let token = Uuid::new_v4().simple().to_string();
    let record = ResetTokenRecord {
        token_hash: hash_token(&token),
        user_id: user.id.clone(),
        expires_at: Utc::now() + Duration::minutes(state.settings.reset_token_expire_minutes),
    };
    state.storage.prune_expired_tokens()?;
    state.storage.save_reset_token(&record)?;

    info!("📧 Password reset link for user {}: {}/reset-password?token={}",
        user.id, state.settings.frontend_url, token);
    Ok(Some(token))
}

// Complete a password reset and sign the user out everywhere
pub fn reset_password(state: &AppState, token: &str, new_password: &str) -> Result<(), ServiceError> {
    validate_password(new_password).map_err(ServiceError::BadRequest)?;
    let password_hash = password::hash_password(new_password, state.settings.bcrypt_cost)?;

    let storage = &state.storage;
    let _guard = storage.lock()?;
    let token_hash = hash_token(token.trim());
    let record = storage
        .find_reset_token(&token_hash)?
        .ok_or_else(|| ServiceError::BadRequest("Invalid or expired token".to_string()))?;
    storage.delete_reset_token(&token_hash)?;

    if record.expires_at < Utc::now() {
        return Err(ServiceError::BadRequest("Invalid or expired token".to_string()));
    }

    let mut user = storage
        .find_user_by_id(&record.user_id)?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
    user.password_hash = password_hash;
    storage.save_user(&user)?;
    storage.delete_refresh_tokens_for_user(&user.id)?;

    info!("✅ Password reset for user: {}", user.id);
    Ok(())
}
