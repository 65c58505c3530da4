//! Admin session endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::auth::{clear_session_headers, session_headers},
    models::admin::{AdminLoginRequest, AdminResponse},
    repositories::admin as admin_repo,
    state::AppState,
    utils::{password::verify_password, tokens::PrincipalKind},
};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<(HeaderMap, Json<AdminResponse>), AppError> {
    payload.validate()?;

    let admin = admin_repo::find_by_username(&state.pool, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid admin credentials".to_string()))?;

    if !verify_password(&payload.password, &admin.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid admin credentials".to_string(),
        ));
    }

    let headers = session_headers(&state, admin.username.clone(), PrincipalKind::Admin)?;
    Ok((headers, Json(admin.into())))
}

pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<Value>) {
    (
        clear_session_headers(&state),
        Json(json!({"message": "Admin logged out"})),
    )
}
