//! Member authentication: password login, QR-token login, logout, and
//! password changes. Every password verification leaves a login_logs row.

use std::time::Duration;

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    models::member::{
        ChangePasswordRequest, LoginRequest, LoginResponse, LoginTargetResponse, Member,
        QrLoginRequest,
    },
    repositories::{login_log, member as member_repo},
    state::AppState,
    utils::{
        cookies::{build_clear_cookie, build_session_cookie, CookieOptions, SameSite},
        password::{hash_password, verify_password},
        tokens::{create_session_token, verify_qr_token, PrincipalKind},
    },
};

fn cookie_options(state: &AppState) -> CookieOptions {
    CookieOptions {
        secure: state.config.secure_cookies,
        same_site: SameSite::Lax,
    }
}

/// Builds the Set-Cookie header carrying a fresh session for `subject`.
pub(crate) fn session_headers(
    state: &AppState,
    subject: String,
    kind: PrincipalKind,
) -> Result<HeaderMap, AppError> {
    let token = create_session_token(
        subject,
        kind,
        &state.config.session_secret,
        state.config.session_expiration_hours,
    )
    .map_err(AppError::InternalServerError)?;

    let cookie = build_session_cookie(
        &token,
        Duration::from_secs(state.config.session_expiration_hours * 3600),
        cookie_options(state),
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::InternalServerError(e.into()))?,
    );
    Ok(headers)
}

pub(crate) fn clear_session_headers(state: &AppState) -> HeaderMap {
    let cookie = build_clear_cookie(cookie_options(state));
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

/// Shared by password and QR login: verifies the password, records the
/// attempt, and opens a member session.
async fn authenticate_member(
    state: &AppState,
    member_id: &str,
    password: &str,
) -> Result<(HeaderMap, Member), AppError> {
    let member = member_repo::find_by_id(&state.pool, member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let password_ok = verify_password(password, &member.password_hash)?;
    login_log::record_attempt(&state.pool, member_id, password_ok).await?;

    if !password_ok {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let headers = session_headers(state, member.member_id.clone(), PrincipalKind::Member)?;
    Ok((headers, member))
}

/// Public identity for a login screen reached by member id.
pub async fn login_target(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<LoginTargetResponse>, AppError> {
    let member = member_repo::find_by_id(&state.pool, &member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(LoginTargetResponse {
        member_id: member.member_id,
        name: member.name,
    }))
}

/// Resolves a scanned QR token to the member it names, without logging in.
pub async fn qr_resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<LoginTargetResponse>, AppError> {
    let member_id = verify_qr_token(&token, &state.config.qr_token_secret)
        .map_err(|_| AppError::Forbidden("Invalid or expired QR code".to_string()))?;

    let member = member_repo::find_by_id(&state.pool, &member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(LoginTargetResponse {
        member_id: member.member_id,
        name: member.name,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), AppError> {
    payload.validate()?;

    let (headers, member) =
        authenticate_member(&state, &payload.member_id, &payload.password).await?;

    Ok((
        headers,
        Json(LoginResponse {
            member: member.into(),
        }),
    ))
}

pub async fn qr_login(
    State(state): State<AppState>,
    Json(payload): Json<QrLoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), AppError> {
    payload.validate()?;

    let member_id = verify_qr_token(&payload.token, &state.config.qr_token_secret)
        .map_err(|_| AppError::Forbidden("Invalid or expired QR code".to_string()))?;

    let (headers, member) = authenticate_member(&state, &member_id, &payload.password).await?;

    Ok((
        headers,
        Json(LoginResponse {
            member: member.into(),
        }),
    ))
}

pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<Value>) {
    (
        clear_session_headers(&state),
        Json(json!({"message": "Logged out"})),
    )
}

/// A member changes their own password. The session is revoked afterwards
/// so the new password must be used to log back in.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(member): Extension<Member>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<(HeaderMap, Json<Value>), AppError> {
    payload.validate()?;

    let current_ok = verify_password(&payload.current_password, &member.password_hash)?;
    login_log::record_attempt(&state.pool, &member.member_id, current_ok).await?;
    if !current_ok {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(&payload.new_password)?;
    member_repo::set_password(&state.pool, &member.member_id, &new_hash).await?;

    Ok((
        clear_session_headers(&state),
        Json(json!({"message": "Password changed. Please log in with your new password."})),
    ))
}
