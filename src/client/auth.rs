// src/client/auth.rs
use crate::client::gateway::ApiClient;
use crate::client::session::SessionStore;
use crate::client::ClientError;
use crate::models::{
    CollaboratorOut, LoginRequest, LogoutRequest, PasswordReset, PasswordResetRequest,
    RegisterRequest, TokenResponse, UserOut,
};
use crate::utils::validation::{validate_email, validate_password};
use log::{info, warn};
use reqwest::Method;
use serde_json::Value;

pub const DASHBOARD_ROUTE: &str = "/dashboard";

// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: UserOut,
    // Collaborator entry gained from a share link opened before signing in
    pub shared_document: Option<CollaboratorOut>,
    pub redirect: String,
}

impl ApiClient {
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserOut, ClientError> {
        validate_email(request.email.trim()).map_err(ClientError::Invalid)?;
        validate_password(&request.password).map_err(ClientError::Invalid)?;

        let body = serde_json::to_value(request)?;
        let response = self
            .send_public(Method::POST, "/auth/register", Some(&body))
            .await?;
        Ok(response.json().await?)
    }

    /// Sign in, store the session, then redeem any pending share link.
    /// The pending token is taken before redeeming, so it is used at most once
    /// whether or not the redemption succeeds.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let tokens: TokenResponse = self
            .send_public(Method::POST, "/auth/login", Some(&body))
            .await?
            .json()
            .await?;

        // Store the tokens and take the pending share token in one update
        let mut pending_share_token = None;
        self.session().update(&mut |session| {
            session.access_token = Some(tokens.access_token.clone());
            session.refresh_token = Some(tokens.refresh_token.clone());
            session.user = Some(tokens.user.clone());
            pending_share_token = session.pending_share_token.take();
        })?;
        info!("🔑 Signed in as {}", tokens.user.email);

        let shared_document = match pending_share_token {
            Some(token) => match self.accept_share_link(&token).await {
                Ok(collaborator) => Some(collaborator),
                Err(e) => {
                    warn!("Pending share link could not be redeemed: {}", e);
                    None
                }
            },
            None => None,
        };

        let redirect = match &shared_document {
            Some(collaborator) => format!("/documents/{}", collaborator.document_id),
            None => DASHBOARD_ROUTE.to_string(),
        };
        Ok(LoginOutcome {
            user: tokens.user,
            shared_document,
            redirect,
        })
    }

    // Server-side revocation is best effort; the local session is always cleared
    pub async fn logout(&self) -> Result<(), ClientError> {
        let refresh_token = self.session().load()?.refresh_token;
        let body = serde_json::to_value(LogoutRequest { refresh_token })?;
        if let Err(e) = self
            .send_public(Method::POST, "/auth/logout", Some(&body))
            .await
        {
            warn!("Logout request failed: {}", e);
        }
        self.session().clear()
    }

    pub async fn me(&self) -> Result<UserOut, ClientError> {
        self.get("/auth/me").await
    }

    // Returns the server's reply; it holds the token only in development setups
    pub async fn request_password_reset(&self, email: &str) -> Result<Value, ClientError> {
        let body = serde_json::to_value(PasswordResetRequest {
            email: email.trim().to_string(),
        })?;
        Ok(self
            .send_public(Method::POST, "/auth/password-reset-request", Some(&body))
            .await?
            .json()
            .await?)
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ClientError> {
        validate_password(new_password).map_err(ClientError::Invalid)?;
        let body = serde_json::to_value(PasswordReset {
            token: token.to_string(),
            new_password: new_password.to_string(),
        })?;
        self.send_public(Method::POST, "/auth/password-reset", Some(&body))
            .await?;
        Ok(())
    }
}
