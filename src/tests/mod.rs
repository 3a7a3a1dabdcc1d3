// HTTP-level tests against the full route table, each on a fresh storage root
use crate::config::Settings;
use crate::models::{RegisterRequest, User};
use crate::services::auth_service;
use crate::utils::jwt;
use crate::AppState;
use actix_web::web;
use tempfile::TempDir;

pub(crate) const PASSWORD: &str = "Secret123";

// App with the same middleware stack as the server binary
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap($crate::utils::auth_middleware::Authentication)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure($crate::routes::configure),
        )
        .await
    };
}

mod document_tests;

pub(crate) fn test_settings(dir: &TempDir) -> Settings {
    Settings {
        storage_path: dir.path().to_path_buf(),
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        expose_reset_tokens: true,
        frontend_url: "http://localhost:3000".to_string(),
        ..Settings::default()
    }
}

pub(crate) fn test_state() -> (TempDir, web::Data<AppState>) {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(test_settings(&dir)).unwrap().into_data();
    (dir, state)
}

// Register a user directly and hand back a bearer header value
pub(crate) fn create_user(state: &AppState, email: &str) -> (User, String) {
    let user = auth_service::register(
        state,
        RegisterRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            username: None,
        },
    )
    .unwrap();
    let token = jwt::generate_access_token(&user, &state.settings).unwrap();
    (user, format!("Bearer {}", token))
}
