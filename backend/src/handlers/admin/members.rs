//! Admin roster management: dashboard stats, CRUD, bulk operations,
//! password resets, CSV import, QR batches, and the image link check.

use std::time::Duration;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::members::build_profile,
    models::member::{
        renewal_for, BulkResetPasswordRequest, BulkUpdateRequest, BulkUpdateResponse,
        CreateMemberRequest, ImageCheckResponse, Member, MemberQrCode, MemberQuery,
        MemberResponse, MemberStats, ProfileResponse, ResetPasswordRequest, UpdateMemberRequest,
    },
    repositories::member as member_repo,
    state::AppState,
    utils::{
        csv_import::{parse_roster_csv, ImportRow},
        drive::{normalize_drive_url, probe_image_url},
        password::hash_password,
        qr::login_qr,
        tokens::create_qr_token,
    },
};

pub async fn stats(State(state): State<AppState>) -> Result<Json<MemberStats>, AppError> {
    let stats = member_repo::stats(&state.pool).await?;
    Ok(Json(stats))
}

pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    let members = member_repo::list(&state.pool, &query).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

pub async fn create_member(
    State(state): State<AppState>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    payload.validate()?;

    let password = payload
        .password
        .clone()
        .unwrap_or_else(|| state.config.default_member_password.clone());
    let password_hash = hash_password(&password)?;

    let member = Member::new(payload, password_hash);
    member_repo::insert(&state.pool, &member)
        .await
        .map_err(|e| {
            if member_repo::is_unique_violation(&e) {
                AppError::Conflict("Member ID already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(Json(member.into()))
}

/// Admin view of any profile, QR material included, no password needed.
pub async fn view_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let member = member_repo::find_by_id(&state.pool, &member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let profile = build_profile(&state, member)?;
    Ok(Json(profile))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let updated = member_repo::update(&state.pool, &member_id, &payload).await?;
    if !updated {
        return Err(AppError::NotFound("Member not found".to_string()));
    }

    Ok(Json(json!({"message": "Member updated", "member_id": member_id})))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = member_repo::delete(&state.pool, &member_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Member not found".to_string()));
    }

    Ok(Json(json!({"message": "Member deleted", "member_id": member_id})))
}

pub async fn bulk_update(
    State(state): State<AppState>,
    Json(payload): Json<BulkUpdateRequest>,
) -> Result<Json<BulkUpdateResponse>, AppError> {
    payload.validate()?;

    let result = member_repo::bulk_update(&state.pool, &payload).await?;
    Ok(Json(result))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let hash = hash_password(&payload.new_password)?;
    let updated = member_repo::set_password(&state.pool, &member_id, &hash).await?;
    if !updated {
        return Err(AppError::NotFound("Member not found".to_string()));
    }

    Ok(Json(json!({"message": "Password reset", "member_id": member_id})))
}

pub async fn bulk_reset_passwords(
    State(state): State<AppState>,
    Json(payload): Json<BulkResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let hash = hash_password(&payload.default_password)?;
    let updated = member_repo::set_all_passwords(&state.pool, &hash).await?;

    Ok(Json(json!({"message": "All member passwords reset", "updated": updated})))
}

#[derive(Debug, Serialize, ToSchema)]
/// Outcome of a roster import.
pub struct ImportResponse {
    pub imported: usize,
    /// Member ids skipped because they already exist.
    pub skipped: Vec<String>,
    /// Per-row parse failures.
    pub errors: Vec<String>,
}

/// Imports members from an uploaded CSV file (multipart field `file`).
/// Existing members are never overwritten.
pub async fn import_members(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            file_bytes = Some(bytes);
        }
    }

    let bytes = file_bytes
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let parsed = parse_roster_csv(&bytes).map_err(|e| AppError::BadRequest(e.to_string()))?;

    // One hash serves every imported row
    let default_hash = hash_password(&state.config.default_member_password)?;

    let mut imported = 0;
    let mut skipped = Vec::new();
    let mut errors = parsed.row_errors;

    for row in parsed.rows {
        let member = match member_from_row(&row, &default_hash) {
            Ok(member) => member,
            Err(msg) => {
                errors.push(format!("{}: {}", row.member_id, msg));
                continue;
            }
        };
        if member_repo::insert_ignore(&state.pool, &member).await? {
            imported += 1;
        } else {
            skipped.push(member.member_id);
        }
    }

    tracing::info!(imported, skipped = skipped.len(), errors = errors.len(), "Roster import finished");

    Ok(Json(ImportResponse {
        imported,
        skipped,
        errors,
    }))
}

fn member_from_row(row: &ImportRow, password_hash: &str) -> Result<Member, String> {
    let date_of_birth = parse_optional_date(row.date_of_birth.as_deref(), "date_of_birth")?;
    let joined_on = parse_optional_date(row.joined_on.as_deref(), "joined_on")?;
    let membership_type = row.membership_type();

    let now = chrono::Utc::now();
    Ok(Member {
        member_id: row.member_id.clone(),
        name: row.name.clone(),
        date_of_birth,
        address: row.address.clone(),
        blood_group: row.blood_group.clone(),
        phone: row.phone.clone(),
        image_url: row.image_url.clone(),
        membership_type,
        joined_on,
        renewal_on: renewal_for(membership_type, joined_on),
        password_hash: password_hash.to_string(),
        created_at: now,
        updated_at: now,
    })
}

fn parse_optional_date(
    value: Option<&str>,
    field: &str,
) -> Result<Option<NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("invalid {} '{}'", field, raw)),
    }
}

/// QR batch for printing membership cards, honoring the roster filters.
pub async fn qr_codes(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<MemberQrCode>>, AppError> {
    let members = member_repo::list(&state.pool, &query).await?;

    let mut codes = Vec::with_capacity(members.len());
    for member in members {
        let token = create_qr_token(
            &member.member_id,
            &state.config.qr_token_secret,
            state.config.qr_token_expiration_days,
        )
        .map_err(AppError::InternalServerError)?;

        match login_qr(&state.config.public_base_url, &token) {
            Ok(qr) => codes.push(MemberQrCode {
                member_id: member.member_id,
                name: member.name,
                qr_svg: qr.svg_data_url,
                login_url: qr.login_url,
            }),
            Err(e) => {
                tracing::warn!(member_id = %member.member_id, error = %e, "Skipping unrenderable QR code");
            }
        }
    }

    Ok(Json(codes))
}

/// Probes every stored image link and reports the unreachable ones.
pub async fn check_images(
    State(state): State<AppState>,
) -> Result<Json<ImageCheckResponse>, AppError> {
    let links = member_repo::image_urls(&state.pool).await?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    let mut reachable = 0;
    let mut unreachable = Vec::new();
    let checked = links.len();

    for (member_id, image_url) in links {
        let target = normalize_drive_url(&image_url);
        if probe_image_url(&client, &target).await {
            reachable += 1;
        } else {
            unreachable.push(member_id);
        }
    }

    Ok(Json(ImageCheckResponse {
        checked,
        reachable,
        unreachable,
    }))
}
