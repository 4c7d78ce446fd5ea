use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::validation::{
    validate_email, validate_id, validate_otp, validate_password_confirmation, validate_phone,
    validate_username,
};
use super::{
    ApiError, ApiResponse, AppState, ChangePasswordRequest, CurrentUserDto, ForgotPasswordRequest,
    LoginRequest, LoginResponse, MessageResponse, MfaChallengeResponse, RegisterRequest,
    ResetPasswordRequest, VerifyOtpRequest,
};
use crate::models::Role;
use crate::security::Claims;
use crate::services::{LoginOutcome, NewAccount, SessionInfo};

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` and makes the verified
/// [`Claims`] available to handlers as an extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = state.shared.auth_service.authenticate(&token)?;

    tracing::Span::current().record("user_id", claims.id);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Must run inside [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<Claims>()
        .is_some_and(|claims| claims.role == Role::Admin);

    if !is_admin {
        return Err(ApiError::forbidden("Administrator access required"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MfaChallengeResponse>>), ApiError> {
    let username = validate_username(&payload.username)?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    validate_password_confirmation(&payload.password, &payload.confirm_password)?;

    let phone = match payload.phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(p) => Some(validate_phone(p)?.to_string()),
    };

    let user_id = state
        .shared
        .auth_service
        .register(NewAccount {
            username,
            email,
            password: payload.password,
            role: Role::User,
            phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MfaChallengeResponse {
            mfa_required: true,
            user_id,
        })),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let response = match state
        .shared
        .auth_service
        .login(&payload.email, &payload.password)
        .await?
    {
        LoginOutcome::Session(session) => LoginResponse::Session(session),
        LoginOutcome::MfaRequired { user_id } => LoginResponse::MfaRequired(MfaChallengeResponse {
            mfa_required: true,
            user_id,
        }),
    };

    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/verify-login-otp
pub async fn verify_login_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<SessionInfo>>, ApiError> {
    let user_id = validate_id(payload.user_id, "user")?;
    let code = validate_otp(&payload.otp)?;

    let session = state
        .shared
        .auth_service
        .verify_login_otp(user_id, code)
        .await?;

    Ok(Json(ApiResponse::success(session)))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let email = validate_email(&payload.email)?;

    state.shared.auth_service.forgot_password(email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "OTP sent to your email",
    ))))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let email = validate_email(&payload.email)?;
    let code = validate_otp(&payload.otp)?;

    state
        .shared
        .auth_service
        .reset_password(email, code, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password reset successful",
    ))))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_password_confirmation(&payload.new_password, &payload.confirm_password)?;

    state
        .shared
        .auth_service
        .change_password(claims.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.shared.auth_service.logout(claims.id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logged out",
    ))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<CurrentUserDto>>, ApiError> {
    let user = state.shared.auth_service.current_user(claims.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
