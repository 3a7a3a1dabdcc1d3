// src/client/gateway.rs
use crate::client::session::SessionStore;
use crate::client::ClientError;
use crate::models::{RefreshRequest, TokenResponse};
use log::{debug, info, warn};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP gateway to the API.
///
/// Protected calls carry the session's bearer token. A `401` triggers one
/// refresh and one replay of the request; if either fails the session is
/// cleared and the call ends in [`ClientError::SessionExpired`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    // Held while a refresh is in flight so concurrent 401s share it
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Authenticated request with the single refresh-and-replay policy.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let token = self.session.load()?.access_token;
        let response = self
            .dispatch(method.clone(), path, query, body, token.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        debug!("401 from {} {}, refreshing session", method, path);
        let fresh = self.refresh_after(token.as_deref()).await?;
        let replay = self
            .dispatch(method.clone(), path, query, body, Some(&fresh))
            .await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            warn!("Replay of {} {} still unauthorized, signing out", method, path);
            self.session.clear()?;
            return Err(ClientError::session_expired());
        }
        check(replay).await
    }

    // Request without credentials or refresh, for the sign-in endpoints
    pub async fn send_public(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let response = self.dispatch(method, path, &[], body, None).await?;
        check(response).await
    }

    // Returns a usable access token, refreshing at most once per stale token
    async fn refresh_after(&self, stale: Option<&str>) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        let mut session = self.session.load()?;
        if let Some(current) = &session.access_token {
            if Some(current.as_str()) != stale {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current.clone());
            }
        }

        let refresh_token = match session.refresh_token.take() {
            Some(token) => token,
            None => {
                self.session.clear()?;
                return Err(ClientError::session_expired());
            }
        };

        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await;
        let tokens = match response {
            Ok(response) if response.status().is_success() => {
                response.json::<TokenResponse>().await.ok()
            }
            Ok(response) => {
                debug!("Refresh rejected with {}", response.status());
                None
            }
            Err(e) => {
                warn!("Refresh request failed: {}", e);
                None
            }
        };

        match tokens {
            Some(tokens) => {
                session.access_token = Some(tokens.access_token.clone());
                session.refresh_token = Some(tokens.refresh_token);
                session.user = Some(tokens.user);
                self.session.save(&session)?;
                info!("🔄 Session refreshed");
                Ok(tokens.access_token)
            }
            None => {
                self.session.clear()?;
                Err(ClientError::session_expired())
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.send(Method::GET, path, query, None).await?;
        Ok(response.json().await?)
    }

    pub async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        let response = self.send(Method::GET, path, &[], None).await?;
        Ok(response.text().await?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.with_body(Method::POST, path, body).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.with_body(Method::PUT, path, body).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.with_body(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    async fn with_body<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(method, path, &[], Some(&body)).await?;
        Ok(response.json().await?)
    }
}

// Non-2xx becomes ClientError::Api with the server's `detail`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(fallback);

    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}
