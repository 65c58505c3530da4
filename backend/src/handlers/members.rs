//! Member-facing profile endpoint.

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    error::AppError,
    models::member::{Member, ProfileResponse},
    state::AppState,
    utils::{drive::normalize_drive_url, qr::login_qr, tokens::create_qr_token},
};

/// Assembles the profile view: member fields, the photo link rewritten to a
/// directly loadable URL, and freshly rendered QR login material.
pub(crate) fn build_profile(
    state: &AppState,
    member: Member,
) -> Result<ProfileResponse, AppError> {
    let photo_url = member
        .image_url
        .as_deref()
        .map(normalize_drive_url);

    let token = create_qr_token(
        &member.member_id,
        &state.config.qr_token_secret,
        state.config.qr_token_expiration_days,
    )
    .map_err(AppError::InternalServerError)?;
    let qr = login_qr(&state.config.public_base_url, &token)
        .map_err(AppError::InternalServerError)?;

    Ok(ProfileResponse {
        member: member.into(),
        photo_url,
        qr_svg: qr.svg_data_url,
        login_url: qr.login_url,
    })
}

/// Profile of the logged-in member.
pub async fn me(
    State(state): State<AppState>,
    Extension(member): Extension<Member>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = build_profile(&state, member)?;
    Ok(Json(profile))
}
