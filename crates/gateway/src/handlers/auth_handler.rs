//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::{AppError, AppResult};
use domain::identity::{TokenResponse, TwoFactorSetup, UserResponse};
use identity_service_lib::{Credentials, Registration};

use crate::extractors::{ClientContext, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@university.edu")]
    pub email: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    #[schema(example = "ada.lovelace")]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "Lovelace")]
    pub last_name: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@university.edu")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// TOTP or backup code, required once two-factor is enabled
    #[schema(example = "492039")]
    pub two_factor_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TwoFactorCodeRequest {
    #[validate(length(min = 6, max = 10, message = "Code must be 6 to 10 characters"))]
    #[schema(example = "492039")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DisableTwoFactorRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Routes reachable without a token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Routes acting on the authenticated account
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/change-password", post(change_password))
        .route("/two-factor/setup", post(setup_two_factor))
        .route("/two-factor/verify", post(verify_two_factor))
        .route("/two-factor/disable", post(disable_two_factor))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .identity
        .auth
        .register(Registration {
            email: payload.email,
            username: payload.username,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login and get an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials, locked account or two-factor code required")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = payload.email.clone();
    let result = state
        .identity
        .auth
        .login(
            Credentials {
                email: payload.email,
                password: payload.password,
                two_factor_code: payload.two_factor_code,
            },
            client,
        )
        .await;

    // Logins touch the last-login time and the lockout shown in profiles
    if state.cache.is_some() {
        match &result {
            Ok(tokens) => match state.identity.auth.verify_token(&tokens.access_token) {
                Ok(claims) => state.forget_user(claims.sub).await,
                Err(_) => state.forget_user_by_email(&email).await,
            },
            Err(AppError::InvalidCredentials | AppError::AccountLocked) => {
                state.forget_user_by_email(&email).await
            }
            Err(_) => {}
        }
    }

    Ok(Json(result?))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenResponse),
        (status = 401, description = "Refresh token invalid, expired or reused")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = state
        .identity
        .auth
        .refresh(&payload.refresh_token, client)
        .await?;
    Ok(Json(tokens))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<StatusCode> {
    state.identity.auth.logout(&payload.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change the current user's password; every session ends
#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password is wrong")
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .identity
        .auth
        .change_password(
            current_user.id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;
    state.forget_user(current_user.id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Start two-factor enrollment
#[utoipa::path(
    post,
    path = "/api/v1/auth/two-factor/setup",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Secret, provisioning URI and backup codes (shown once)", body = TwoFactorSetup),
        (status = 409, description = "Two-factor already enabled")
    )
)]
pub async fn setup_two_factor(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<TwoFactorSetup>> {
    let setup = state.identity.two_factor.setup(current_user.id).await?;
    Ok(Json(setup))
}

/// Confirm two-factor enrollment with a code from the authenticator
#[utoipa::path(
    post,
    path = "/api/v1/auth/two-factor/verify",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = TwoFactorCodeRequest,
    responses(
        (status = 204, description = "Two-factor enabled"),
        (status = 401, description = "Invalid code")
    )
)]
pub async fn verify_two_factor(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TwoFactorCodeRequest>,
) -> AppResult<StatusCode> {
    state
        .identity
        .two_factor
        .verify(current_user.id, &payload.code)
        .await?;
    state.forget_user(current_user.id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/two-factor/disable",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = DisableTwoFactorRequest,
    responses(
        (status = 204, description = "Two-factor disabled"),
        (status = 401, description = "Wrong password")
    )
)]
pub async fn disable_two_factor(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DisableTwoFactorRequest>,
) -> AppResult<StatusCode> {
    state
        .identity
        .two_factor
        .disable(current_user.id, &payload.password)
        .await?;
    state.forget_user(current_user.id).await;
    Ok(StatusCode::NO_CONTENT)
}
