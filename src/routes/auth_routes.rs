use crate::models::{
    LoginRequest, LogoutRequest, OAuthLoginForm, PasswordReset, PasswordResetRequest,
    RefreshRequest, RegisterRequest, ServiceError, UserOut,
};
use crate::services::auth_service;
use crate::utils::{get_user_id_from_request, ACCESS_COOKIE};
use crate::AppState;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, web, Either, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde_json::json;

const RESET_REQUESTED: &str = "If an account exists for that email, a reset link has been sent.";

fn access_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(ACCESS_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

// Register a new user; also served as /auth/signup
async fn register(
    state: web::Data<AppState>,
    data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!("📝 Register request for email: {}", data.email);

    let user = auth_service::register(&state, data.into_inner()).map_err(|e| {
        error!("❌ Registration rejected: {}", e);
        e
    })?;

    Ok(HttpResponse::Created().json(UserOut::from(&user)))
}

// Login with a JSON body or an OAuth2 password form
#[post("/auth/login")]
async fn login(
    state: web::Data<AppState>,
    body: Either<web::Json<LoginRequest>, web::Form<OAuthLoginForm>>,
) -> Result<HttpResponse, ServiceError> {
    let request: LoginRequest = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner().into(),
    };
    info!("🔑 Login request for email: {}", request.email);

    let tokens = auth_service::login(&state, request).map_err(|e| {
        error!("❌ Login failed: {}", e);
        e
    })?;

    info!("✅ User logged in successfully: {}", tokens.user.id);
    Ok(HttpResponse::Ok()
        .cookie(access_cookie(&tokens.access_token))
        .json(tokens))
}

#[post("/auth/refresh")]
async fn refresh(
    state: web::Data<AppState>,
    data: web::Json<RefreshRequest>,
) -> Result<HttpResponse, ServiceError> {
    debug!("🔄 Refresh request");
    let tokens = auth_service::refresh(&state, &data.refresh_token)?;
    Ok(HttpResponse::Ok()
        .cookie(access_cookie(&tokens.access_token))
        .json(tokens))
}

// Body is optional so cookie-only clients can log out too
#[post("/auth/logout")]
async fn logout(
    state: web::Data<AppState>,
    data: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse, ServiceError> {
    let request = data.map(|d| d.into_inner()).unwrap_or_default();
    auth_service::logout(&state, request.refresh_token.as_deref())?;

    let mut removal = Cookie::build(ACCESS_COOKIE, "").path("/").finish();
    removal.make_removal();
    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(json!({ "message": "Successfully logged out" })))
}

// Always answers the same way so callers cannot tell which emails have accounts
async fn password_reset_request(
    state: web::Data<AppState>,
    data: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!("📧 Password reset requested");
    let token = auth_service::request_password_reset(&state, &data.email)?;

    let body = match token {
        Some(token) if state.settings.expose_reset_tokens => {
            json!({ "message": RESET_REQUESTED, "reset_token": token })
        }
        _ => json!({ "message": RESET_REQUESTED }),
    };
    Ok(HttpResponse::Ok().json(body))
}

async fn password_reset(
    state: web::Data<AppState>,
    data: web::Json<PasswordReset>,
) -> Result<HttpResponse, ServiceError> {
    auth_service::reset_password(&state, &data.token, &data.new_password).map_err(|e| {
        error!("❌ Password reset failed: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password has been reset successfully." })))
}

// Get current user info (requires authentication)
#[get("/auth/me")]
async fn me(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    debug!("👤 Get user info request: {}", user_id);

    match state.storage.find_user_by_id(&user_id)? {
        Some(user) if user.is_active => Ok(HttpResponse::Ok().json(UserOut::from(&user))),
        _ => {
            error!("❌ Token for missing or inactive user: {}", user_id);
            Err(ServiceError::Unauthorized)
        }
    }
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/auth/register", "/auth/signup"]).route(web::post().to(register)),
    )
    .service(login)
    .service(refresh)
    .service(logout)
    .service(
        web::resource(["/auth/password-reset-request", "/auth/forgot-password"])
            .route(web::post().to(password_reset_request)),
    )
    .service(
        web::resource(["/auth/password-reset", "/auth/reset-password"])
            .route(web::post().to(password_reset)),
    )
    .service(me);
}
