use crate::{
    models::{
        LoginRequest, LogoutResponse, RegisterRequest, UpstreamAuthResult, UpstreamMe,
        UserResponse,
    },
    normalize::normalize,
    session::Session,
    state::AppState,
    upstream::{UpstreamBody, UpstreamFailure},
    utils::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use http::Method;
use serde_json::json;

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";

const ME_FAILED: &str = "Failed to fetch current user";

/// Handle user login. Cookies are written only once upstream has accepted the
/// credentials and returned both tokens.
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Json(request): Json<LoginRequest>,
) -> (Session, ApiResult<Json<UserResponse>>) {
    let result = sign_in(&state, &mut session, request).await;
    (session, result)
}

async fn sign_in(
    state: &AppState,
    session: &mut Session,
    request: LoginRequest,
) -> ApiResult<Json<UserResponse>> {
    let payload = json!({
        "emailOrUsername": request.email_or_username,
        "password": request.password,
    });

    let value = state
        .upstream
        .send(Method::POST, LOGIN_PATH, None, Some(UpstreamBody::Json(payload)))
        .await
        .map_err(|failure| normalize(&failure, "Failed to sign in", state.config.is_dev()))?;

    let auth: UpstreamAuthResult = serde_json::from_value(value).map_err(|e| {
        tracing::error!("Unexpected login response from upstream: {}", e);
        ApiError::internal("Failed to sign in")
    })?;

    session.write(auth.access_token.as_str(), auth.refresh_token.as_str());
    tracing::debug!(username = %auth.username, expires_at = ?auth.expires_at, "Session established");

    Ok(Json(UserResponse { user: auth.into() }))
}

/// Handle user registration. No session is created; the caller logs in afterwards.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<StatusCode> {
    let payload = json!({
        "email": request.email,
        "username": request.username,
        "password": request.password,
    });

    state
        .upstream
        .send(Method::POST, REGISTER_PATH, None, Some(UpstreamBody::Json(payload)))
        .await
        .map_err(|failure| normalize(&failure, "Failed to sign up", state.config.is_dev()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the identity behind the current session.
///
/// Failures other than 401 are reported as a generic 500 without any upstream
/// detail.
pub async fn me(
    State(state): State<AppState>,
    mut session: Session,
) -> (Session, ApiResult<Json<UserResponse>>) {
    let result = current_user(&state, &mut session).await;
    (session, result)
}

async fn current_user(state: &AppState, session: &mut Session) -> ApiResult<Json<UserResponse>> {
    let Some(token) = session.read().map(str::to_string) else {
        session.clear();
        return Err(ApiError::unauthorized());
    };

    let value = match state.upstream.send(Method::GET, ME_PATH, Some(token.as_str()), None).await {
        Ok(value) => value,
        Err(failure) => {
            let normalized = normalize(&failure, ME_FAILED, state.config.is_dev());
            if normalized.is_unauthorized() {
                session.clear();
                return Err(ApiError::unauthorized());
            }
            return Err(ApiError::internal(ME_FAILED));
        }
    };

    let me: UpstreamMe = serde_json::from_value(value).map_err(|e| {
        tracing::error!("Unexpected me response from upstream: {}", e);
        ApiError::internal(ME_FAILED)
    })?;

    Ok(Json(UserResponse { user: me.into() }))
}

/// Outcome of telling upstream about a logout. Never surfaced to the browser.
#[derive(Debug)]
pub enum LogoutNotice {
    Delivered,
    /// No refresh token cookie, so there was nothing to revoke.
    Skipped,
    Failed(UpstreamFailure),
}

/// End the session. Both cookies are cleared whatever upstream does.
pub async fn logout(
    State(state): State<AppState>,
    mut session: Session,
) -> (Session, Json<LogoutResponse>) {
    match notify_logout(&state, session.refresh_token()).await {
        LogoutNotice::Delivered => tracing::debug!("Upstream logout delivered"),
        LogoutNotice::Skipped => tracing::debug!("No refresh token, upstream logout skipped"),
        LogoutNotice::Failed(failure) => tracing::warn!("Upstream logout ignored: {}", failure),
    }

    session.clear();
    (session, Json(LogoutResponse { success: true }))
}

async fn notify_logout(state: &AppState, refresh_token: Option<&str>) -> LogoutNotice {
    let Some(refresh_token) = refresh_token else {
        return LogoutNotice::Skipped;
    };

    let payload = json!({ "refreshToken": refresh_token });
    match state
        .upstream
        .send(Method::POST, LOGOUT_PATH, None, Some(UpstreamBody::Json(payload)))
        .await
    {
        Ok(_) => LogoutNotice::Delivered,
        Err(failure) => LogoutNotice::Failed(failure),
    }
}
