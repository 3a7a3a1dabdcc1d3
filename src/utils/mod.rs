use crate::models::{Claims, ServiceError};
use actix_web::{HttpMessage, HttpRequest};
use sha2::{Digest, Sha256};

pub mod document_storage;
pub mod share_storage;
pub mod storage;
pub mod token_storage;
pub mod user_storage;
pub mod validation;
pub mod workspace_storage;

pub use storage::Storage;

// Name of the cookie carrying the access token in the cookie-session variant
pub const ACCESS_COOKIE: &str = "access_token";

// Pull the authenticated user id placed in the request by the auth middleware
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    req.extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or(ServiceError::Unauthorized)
}

// Hex SHA-256, used so raw reset tokens never touch the disk
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

// JWT utility functions
pub mod jwt {
    use crate::config::Settings;
    use crate::models::{Claims, RefreshTokenRecord, ServiceError, TokenType, User};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
    use log::debug;
    use uuid::Uuid;

    fn issue(
        user: &User,
        settings: &Settings,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<(String, Claims), ServiceError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(lifetime)
            .ok_or(ServiceError::InternalServerError)?;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.jwt_secret.as_ref()),
        )
        .map_err(|_| ServiceError::InternalServerError)?;
        Ok((token, claims))
    }

    // Short-lived token sent on every request
    pub fn generate_access_token(user: &User, settings: &Settings) -> Result<String, ServiceError> {
        let lifetime = Duration::minutes(settings.access_token_expire_minutes);
        issue(user, settings, TokenType::Access, lifetime).map(|(token, _)| token)
    }

    // Refresh token plus the record that keeps it redeemable
    pub fn generate_refresh_token(
        user: &User,
        settings: &Settings,
    ) -> Result<(String, RefreshTokenRecord), ServiceError> {
        let lifetime = Duration::days(settings.refresh_token_expire_days);
        let (token, claims) = issue(user, settings, TokenType::Refresh, lifetime)?;
        let record = RefreshTokenRecord {
            jti: claims.jti,
            user_id: claims.sub,
            expires_at: Utc::now() + lifetime,
        };
        Ok((token, record))
    }

    // Validate and decode a JWT token of the expected type
    pub fn decode_token(
        token: &str,
        settings: &Settings,
        expected: TokenType,
    ) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(settings.jwt_secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Rejected token: {:?}", e);
            ServiceError::Unauthorized
        })?;

        if claims.token_type != expected {
            debug!("Rejected {:?} token where {:?} was expected", claims.token_type, expected);
            return Err(ServiceError::Unauthorized);
        }
        Ok(claims)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").trim().to_string())
    }
}

// Password utility functions
pub mod password {
    use crate::models::ServiceError;
    use bcrypt::{hash, verify};
    use log::error;

    // Hash a password using bcrypt
    pub fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
        hash(password, cost).map_err(|e| {
            error!("❌ Failed to hash password: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
        verify(password, hash).map_err(|e| {
            error!("❌ Failed to verify password: {:?}", e);
            ServiceError::InternalServerError
        })
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::{jwt, ACCESS_COOKIE};
    use crate::models::{ServiceError, TokenType};
    use crate::AppState;
    use actix_web::body::EitherBody;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::{header, Method};
    use actix_web::{web, Error, HttpMessage, ResponseError};
    use futures::future::{ok, LocalBoxFuture, Ready};
    use log::{debug, error};

    // Routes reachable without a token
    const PUBLIC_PATHS: [&str; 10] = [
        "/",
        "/auth/login",
        "/auth/register",
        "/auth/signup",
        "/auth/refresh",
        "/auth/logout",
        "/auth/password-reset-request",
        "/auth/password-reset",
        "/auth/forgot-password",
        "/auth/reset-password",
    ];

    pub fn is_public_path(path: &str) -> bool {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        PUBLIC_PATHS.contains(&normalized)
    }

    // Bearer header first, then the session cookie
    fn request_token(req: &ServiceRequest) -> Option<String> {
        if let Some(value) = req.headers().get(header::AUTHORIZATION) {
            return value
                .to_str()
                .ok()
                .and_then(|auth_str| jwt::extract_token_from_header(auth_str).ok());
        }
        req.request()
            .cookie(ACCESS_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }

    // Answer with the same JSON error body the handlers use
    fn reject<B>(req: ServiceRequest, error: ServiceError) -> ServiceResponse<EitherBody<B>> {
        let (request, _payload) = req.into_parts();
        let response = error.error_response().map_into_right_body();
        ServiceResponse::new(request, response)
    }

    pub struct Authentication;

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware { service })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            if *req.method() == Method::OPTIONS || is_public_path(req.path()) {
                let fut = self.service.call(req);
                return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
            }

            let settings = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.settings.clone(),
                None => {
                    error!("❌ Application state missing; cannot authenticate request");
                    return Box::pin(async move { Ok(reject(req, ServiceError::InternalServerError)) });
                }
            };

            if let Some(token) = request_token(&req) {
                if let Ok(claims) = jwt::decode_token(&token, &settings, TokenType::Access) {
                    // Add the claims to the request extensions
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
                }
            }

            debug!("Unauthenticated request to {}", req.path());
            Box::pin(async move { Ok(reject(req, ServiceError::Unauthorized)) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::auth_middleware::is_public_path;
    use super::*;
    use crate::config::Settings;
    use crate::models::{TokenType, User};
    use chrono::Utc;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            username: None,
            password_hash: String::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn access_and_refresh_tokens_are_not_interchangeable() {
        let settings = Settings::default();
        let access = jwt::generate_access_token(&user(), &settings).unwrap();
        let (refresh, record) = jwt::generate_refresh_token(&user(), &settings).unwrap();

        assert_eq!(jwt::decode_token(&access, &settings, TokenType::Access).unwrap().sub, "user-1");
        assert!(jwt::decode_token(&access, &settings, TokenType::Refresh).is_err());
        let claims = jwt::decode_token(&refresh, &settings, TokenType::Refresh).unwrap();
        assert_eq!(claims.jti, record.jti);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let settings = Settings::default();
        let other = Settings {
            jwt_secret: "another-secret".to_string(),
            ..Settings::default()
        };
        let token = jwt::generate_access_token(&user(), &other).unwrap();
        assert_eq!(
            jwt::decode_token(&token, &settings, TokenType::Access).unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let settings = Settings {
            access_token_expire_minutes: -5,
            ..Settings::default()
        };
        let token = jwt::generate_access_token(&user(), &settings).unwrap();
        assert!(jwt::decode_token(&token, &settings, TokenType::Access).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(jwt::extract_token_from_header("Bearer abc").unwrap(), "abc");
        assert!(jwt::extract_token_from_header("Token abc").is_err());
    }

    #[test]
    fn public_paths_ignore_trailing_slash() {
        assert!(is_public_path("/auth/login/"));
        assert!(is_public_path("/"));
        assert!(!is_public_path("/documents"));
        assert!(!is_public_path("/auth/me"));
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        let hashed = hash_token("abc");
        assert_eq!(
            hashed,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn password_hash_verifies() {
        let hashed = password::hash_password("Secret123", 4).unwrap();
        assert!(password::verify_password("Secret123", &hashed).unwrap());
        assert!(!password::verify_password("Secret124", &hashed).unwrap());
    }
}
